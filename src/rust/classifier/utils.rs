use ndarray::{Array1, ArrayView1};

/// Numerically stable softmax. An empty input yields an empty output.
pub(crate) fn softmax(logits: ArrayView1<f32>) -> Array1<f32> {
    if logits.is_empty() {
        return Array1::zeros(0);
    }
    let max = logits.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    let exps = logits.mapv(|x| (x - max).exp());
    let sum = exps.sum();
    if sum > 0.0 {
        exps / sum
    } else {
        Array1::zeros(logits.len())
    }
}

/// Indices of `scores` ordered by descending score. Ties keep index order.
pub(crate) fn rank_descending(scores: &Array1<f32>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}
