//! 随机访问序列生成

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vm_paging::PageId;

/// 在 `[0, virtual_pages)` 内均匀生成 `len` 个页号
///
/// 给定 `seed` 时结果可复现。`virtual_pages` 必须大于 0。
pub fn generate_trace(len: usize, virtual_pages: u64, seed: Option<u64>) -> Vec<PageId> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..len).map(|_| rng.gen_range(0..virtual_pages)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_trace_is_reproducible() {
        let a = generate_trace(64, 10, Some(42));
        let b = generate_trace(64, 10, Some(42));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.iter().all(|&page| page < 10));
    }

    #[test]
    fn test_single_page_space() {
        assert!(generate_trace(8, 1, None).iter().all(|&page| page == 0));
    }
}
