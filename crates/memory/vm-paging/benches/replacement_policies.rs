//! 替换策略基准测试
//!
//! 对比各策略与页表组织方式在同一访问序列上的模拟开销。

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vm_paging::{ComparisonRunner, PageId, PageTableKind, PolicyKind, SimulationConfig, simulate};

/// 带局部性的确定性访问序列
fn workload(len: usize, pages: u64) -> Vec<PageId> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            // 3/4 的访问落在滑动的工作集内
            if state % 4 == 0 {
                state % pages
            } else {
                (i as u64 / 64 + state % 8) % pages
            }
        })
        .collect()
}

fn bench_policies(c: &mut Criterion) {
    let trace = workload(10_000, 256);
    let mut group = c.benchmark_group("policy");

    for policy in PolicyKind::ALL {
        let config = SimulationConfig::new(32, policy).with_history_limit(Some(0));
        group.bench_with_input(BenchmarkId::from_parameter(policy), &config, |b, config| {
            b.iter(|| simulate(black_box(&trace), config));
        });
    }
    group.finish();
}

fn bench_page_tables(c: &mut Criterion) {
    let trace = workload(10_000, 4096);
    let mut group = c.benchmark_group("page_table");

    for table in PageTableKind::ALL {
        let config = SimulationConfig::new(64, PolicyKind::Lru)
            .with_table(table)
            .with_tlb(16)
            .with_history_limit(Some(0));
        group.bench_with_input(BenchmarkId::from_parameter(table), &config, |b, config| {
            b.iter(|| simulate(black_box(&trace), config));
        });
    }
    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let trace = workload(10_000, 256);
    let runner = ComparisonRunner::new(
        &trace,
        SimulationConfig::new(32, PolicyKind::Fifo).with_history_limit(Some(0)),
    );
    c.bench_function("compare_all_policies", |b| {
        b.iter(|| runner.run_all());
    });
}

criterion_group!(benches, bench_policies, bench_page_tables, bench_comparison);
criterion_main!(benches);
