//! Entropies and the permutation-model expected mutual information

use super::partition::Partition;
use super::{Evaluation, ObjectiveKind};
use ndarray::ArrayView1;

/// Target-side quantities shared by every evaluation against one target
#[derive(Debug, Clone)]
pub struct InformationContext {
    n_rows: usize,
    target_codes: Vec<u32>,
    target_arity: usize,
    target_counts: Vec<u32>,
    target_entropy: f64,
    /// `ln_factorial[k] = ln(k!)`
    ln_factorial: Vec<f64>,
}

impl InformationContext {
    pub fn new(target: ArrayView1<'_, u32>, arity: usize) -> Self {
        let n_rows = target.len();
        let arity = arity.max(1);
        let mut target_counts = vec![0u32; arity];
        for &y in target.iter() {
            target_counts[y as usize] += 1;
        }

        let target_entropy = entropy(&target_counts, n_rows);

        let mut ln_factorial = Vec::with_capacity(n_rows + 1);
        ln_factorial.push(0.0);
        for k in 1..=n_rows {
            let prev = ln_factorial[k - 1];
            ln_factorial.push(prev + (k as f64).ln());
        }

        Self {
            n_rows,
            target_codes: target.to_vec(),
            target_arity: arity,
            target_counts,
            target_entropy,
            ln_factorial,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.n_rows
    }

    /// Empirical entropy of the target in nats
    pub fn target_entropy(&self) -> f64 {
        self.target_entropy
    }

    /// Score the partition of a subset against the target
    pub fn measure(&self, partition: &Partition, kind: ObjectiveKind) -> Evaluation {
        let blocks = partition.num_blocks();
        if self.target_entropy <= 0.0 {
            return Evaluation {
                score: 0.0,
                information: 0.0,
                bias: 0.0,
                blocks,
                pure: true,
            };
        }

        let width = self.target_arity;
        let mut counts = vec![0u32; blocks * width];
        for (&block, &y) in partition.ids().iter().zip(&self.target_codes) {
            counts[block as usize * width + y as usize] += 1;
        }

        // n * H(Y|X) accumulated block by block
        let mut weighted = 0.0;
        let mut pure = true;
        for row in counts.chunks_exact(width) {
            let size: u32 = row.iter().sum();
            let mut seen = 0;
            for &c in row.iter().filter(|&&c| c > 0) {
                seen += 1;
                weighted += c as f64 * (size as f64 / c as f64).ln();
            }
            pure &= seen <= 1;
        }

        let information = if pure {
            1.0
        } else {
            let conditional = weighted / self.n_rows as f64;
            ((self.target_entropy - conditional) / self.target_entropy).clamp(0.0, 1.0)
        };

        let bias = match kind {
            ObjectiveKind::FractionOfInformation => 0.0,
            ObjectiveKind::ReliableFractionOfInformation => {
                self.expected_mutual_information(&partition.block_sizes()) / self.target_entropy
            }
        };

        Evaluation {
            score: information - bias,
            information,
            bias,
            blocks,
            pure,
        }
    }

    /// Expected mutual information between a partition with the given block
    /// sizes and a uniformly permuted target (hypergeometric model)
    pub fn expected_mutual_information(&self, block_sizes: &[u32]) -> f64 {
        let n = self.n_rows;
        if n == 0 {
            return 0.0;
        }

        let mut sizes = block_sizes.to_vec();
        sizes.sort_unstable();

        let mut total = 0.0;
        let mut i = 0;
        while i < sizes.len() {
            let a = sizes[i] as usize;
            let mut multiplicity = 0usize;
            while i < sizes.len() && sizes[i] as usize == a {
                multiplicity += 1;
                i += 1;
            }
            if a == 0 {
                continue;
            }

            let per_block: f64 = self
                .target_counts
                .iter()
                .filter(|&&b| b > 0)
                .map(|&b| self.cell_expectation(a, b as usize))
                .sum();
            total += multiplicity as f64 * per_block;
        }
        total.max(0.0)
    }

    /// Expected contribution `E[(k/n) ln(n k / (a b))]` of one contingency cell
    fn cell_expectation(&self, a: usize, b: usize) -> f64 {
        let n = self.n_rows;
        let n_f = n as f64;
        let lo = (a + b).saturating_sub(n).max(1);
        let hi = a.min(b);
        let log_norm = self.ln_choose(n, a);

        (lo..=hi)
            .map(|k| {
                let log_p = self.ln_choose(b, k) + self.ln_choose(n - b, a - k) - log_norm;
                let term = (n_f * k as f64 / (a as f64 * b as f64)).ln();
                (k as f64 / n_f) * term * log_p.exp()
            })
            .sum()
    }

    fn ln_choose(&self, n: usize, k: usize) -> f64 {
        self.ln_factorial[n] - self.ln_factorial[k] - self.ln_factorial[n - k]
    }
}

/// Plug-in entropy of a count vector in nats
pub fn entropy(counts: &[u32], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.ln()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_entropy() {
        assert!((entropy(&[2, 2], 4) - 2f64.ln()).abs() < EPS);
        assert_eq!(entropy(&[4, 0], 4), 0.0);
        assert_eq!(entropy(&[], 0), 0.0);
    }

    #[test]
    fn test_copy_of_target_on_four_rows() {
        // Blocks of size 2 against a balanced binary target:
        // F = 1, b0 = (4 * ln2 / 12) / ln2 = 1/3
        let y = arr1(&[0u32, 0, 1, 1]);
        let ctx = InformationContext::new(y.view(), 2);
        let p = Partition::from_codes(y.view(), 2);

        let eval = ctx.measure(&p, ObjectiveKind::ReliableFractionOfInformation);
        assert!(eval.pure);
        assert_eq!(eval.information, 1.0);
        assert!((eval.bias - 1.0 / 3.0).abs() < EPS);
        assert!((eval.score - 2.0 / 3.0).abs() < EPS);

        let plain = ctx.measure(&p, ObjectiveKind::FractionOfInformation);
        assert_eq!(plain.score, 1.0);
    }

    #[test]
    fn test_key_partition_scores_zero() {
        // All-singleton partitions carry their full information as bias
        let y = arr1(&[0u32, 1, 2, 0, 1, 1, 2]);
        let ctx = InformationContext::new(y.view(), 3);
        let key = Partition::from_codes(arr1(&[0u32, 1, 2, 3, 4, 5, 6]).view(), 7);

        let eval = ctx.measure(&key, ObjectiveKind::ReliableFractionOfInformation);
        assert_eq!(eval.information, 1.0);
        assert!((eval.bias - 1.0).abs() < 1e-9);
        assert!(eval.score.abs() < 1e-9);
    }

    #[test]
    fn test_trivial_partition() {
        let y = arr1(&[0u32, 1, 1, 0, 1]);
        let ctx = InformationContext::new(y.view(), 2);
        let eval = ctx.measure(&Partition::trivial(5), ObjectiveKind::ReliableFractionOfInformation);
        assert!(eval.information.abs() < EPS);
        assert_eq!(eval.bias, 0.0);
        assert!(eval.score.abs() < EPS);
        assert!(!eval.pure);
    }

    #[test]
    fn test_constant_target() {
        let y = arr1(&[1u32, 1, 1]);
        let ctx = InformationContext::new(y.view(), 2);
        assert_eq!(ctx.target_entropy(), 0.0);
        let p = Partition::from_codes(arr1(&[0u32, 1, 0]).view(), 2);
        let eval = ctx.measure(&p, ObjectiveKind::ReliableFractionOfInformation);
        assert_eq!(eval.score, 0.0);
    }

    #[test]
    fn test_bias_grows_with_refinement() {
        let y = arr1(&[0u32, 1, 0, 1, 1, 0, 0, 1, 1, 0]);
        let ctx = InformationContext::new(y.view(), 2);
        let coarse = Partition::from_codes(arr1(&[0u32, 0, 0, 0, 0, 1, 1, 1, 1, 1]).view(), 2);
        let fine = coarse.refine(arr1(&[0u32, 1, 0, 1, 0, 1, 0, 1, 0, 1]).view(), 2);

        let a = ctx.measure(&coarse, ObjectiveKind::ReliableFractionOfInformation);
        let b = ctx.measure(&fine, ObjectiveKind::ReliableFractionOfInformation);
        assert!(b.bias >= a.bias);
        assert!(b.information >= a.information);
    }
}
