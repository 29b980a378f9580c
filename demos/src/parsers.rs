//! Command line enums for the demo drivers.
//!
//! Each variant can be given by its full name or by any prefix that already determines it,
//! plus a few extra aliases.

use clap::ValueEnum;
use clap::builder::PossibleValue;
use sparsify_matrix::SparseFormat;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormatOptions {
    Csr,
    Csc,
}

impl From<FormatOptions> for SparseFormat {
    fn from(option: FormatOptions) -> Self {
        match option {
            FormatOptions::Csr => SparseFormat::Csr,
            FormatOptions::Csc => SparseFormat::Csc,
        }
    }
}

/// Produce a PossibleValue accepting `base`, every prefix of it at least `min_unique_base_prefix`
/// long, and each alias together with its prefixes of at least the given length.
///
/// For example `get_aliases("csr", 3, Some(vec![("row", 1)]))` accepts:
///
/// ```text
/// csr, r, ro, row
/// ```
fn get_aliases(
    base: &'static str,
    min_unique_base_prefix: usize,
    alias: Option<Vec<(&'static str, usize)>>,
) -> PossibleValue {
    let base_prefixes = (min_unique_base_prefix..base.len()).map(|i| &base[..i]);
    match alias {
        None => PossibleValue::new(base).aliases(base_prefixes),
        Some(vec) => PossibleValue::new(base).aliases(base_prefixes.chain(
            vec.into_iter().flat_map(|(alias, min_unique)| {
                (min_unique..alias.len() + 1).map(|i| &alias[..i])
            }),
        )),
    }
}

impl ValueEnum for FormatOptions {
    fn value_variants<'a>() -> &'a [Self] {
        &[FormatOptions::Csr, FormatOptions::Csc]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            FormatOptions::Csr => get_aliases("csr", 3, Some(vec![("row", 1), ("2", 1)])),
            FormatOptions::Csc => get_aliases("csc", 3, Some(vec![("column", 2), ("1", 1)])),
        })
    }
}
