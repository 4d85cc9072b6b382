//! Combinations of instantiation sets.

use idlwrap_parser::ast::Type;

/// Every combination taking one type from each set, first set varying
/// slowest.
///
/// No sets yields one empty combination; any empty set yields none.
pub fn cartesian_product(sets: &[&[Type]]) -> Vec<Vec<Type>> {
    let mut combos: Vec<Vec<Type>> = vec![Vec::new()];
    for set in sets {
        combos = combos
            .iter()
            .flat_map(|prefix| {
                set.iter().map(move |ty| {
                    let mut combo = prefix.clone();
                    combo.push(ty.clone());
                    combo
                })
            })
            .collect();
    }
    combos
}
