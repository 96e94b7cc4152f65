use anyhow::Result;
use candle_core::{DType, Tensor};

/// Mean over unmasked tokens followed by L2 normalization: `[B,T,H] -> [B,H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    anyhow::ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    let batch = dims[0];
    let hidden_dim = dims[2];

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast = mask_3d.broadcast_as(hidden.shape()).or_else(|_| mask_3d.repeat((1, 1, hidden_dim)))?;
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    let mut mean = sum.broadcast_div(&lengths)?;
    let eps_val = match hidden.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    let eps = Tensor::new(&[eps_val], hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(0)?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.broadcast_add(&eps)?;
    mean = mean.broadcast_div(&norm)?;
    anyhow::ensure!(mean.dims() == [batch, hidden_dim], "pooled shape mismatch: {:?}", mean.dims());
    Ok(mean)
}

/// Weights for pooling `n` section vectors into one document vector,
/// rising linearly from 0.1 (first section) to 1.0 (last section).
pub fn document_weights(n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![0.1],
        _ => {
            let step = 0.9 / (n - 1) as f32;
            (0..n).map(|i| 0.1 + step * i as f32).collect()
        }
    }
}

/// Weighted mean of section vectors; later sections count more.
/// No sections pools to the zero vector.
pub fn weighted_document_pool(vectors: &[Vec<f32>], dim: usize) -> Vec<f32> {
    let mut pooled = vec![0f32; dim];
    if vectors.is_empty() {
        return pooled;
    }
    for (v, w) in vectors.iter().zip(document_weights(vectors.len())) {
        for (acc, x) in pooled.iter_mut().zip(v) {
            *acc += w * x;
        }
    }
    let n = vectors.len() as f32;
    for x in &mut pooled {
        *x /= n;
    }
    pooled
}
