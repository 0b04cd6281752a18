/// Mid-ranks (1-based) of `values`, plus the tie term Σ(t³ − t) over every
/// group of `t` equal values.
pub fn midranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for index in &order[start..=end] {
            ranks[*index] = rank;
        }
        let tied = (end - start + 1) as f64;
        tie_term += tied.powi(3) - tied;
        start = end + 1;
    }

    (ranks, tie_term)
}
