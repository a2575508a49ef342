//! Eager N-ary Cartesian product.

/// Returns every tuple that picks one element from each of `lists`.
///
/// Tuples are in lexicographic order: the first list varies slowest and the
/// last list fastest. The product of zero lists is a single empty tuple; if
/// any list is empty the product is empty.
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut tuple = Vec::with_capacity(prefix.len() + 1);
                    tuple.extend_from_slice(prefix);
                    tuple.push(item.clone());
                    tuple
                })
            })
            .collect()
    })
}
