use core::hash::BuildHasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;
use string_set::StringSet;

type HashbrownSet = hashbrown::HashSet<Box<str>, SipState>;
type ChainedSet = StringSet<Box<str>, SipState>;

/// Both sets hash with the same keyed SipHash so only the layout differs.
#[derive(Clone, Copy)]
struct SipState {
    k0: u64,
    k1: u64,
}

impl Default for SipState {
    fn default() -> Self {
        let mut rng = OsRng;
        Self {
            k0: rng.try_next_u64().unwrap(),
            k1: rng.try_next_u64().unwrap(),
        }
    }
}

impl BuildHasher for SipState {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(self.k0, self.k1)
    }
}

trait KeyFormat {
    fn key(id: u64) -> String;
}

struct ShortKey;

impl KeyFormat for ShortKey {
    fn key(id: u64) -> String {
        format!("k{id:X}")
    }
}

struct PaddedKey;

impl KeyFormat for PaddedKey {
    fn key(id: u64) -> String {
        format!("xxxxxxxxxxxxxxxxx_{id:016X}")
    }
}

struct LongKey;

impl KeyFormat for LongKey {
    fn key(id: u64) -> String {
        format!("key_{id:064b}")
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 11),
    (1 << 12),
    (1 << 13),
    (1 << 14),
    (1 << 15),
    (1 << 16),
    (1 << 17),
    (1 << 18),
];

fn filled(keys: &[String], state: SipState) -> (ChainedSet, HashbrownSet) {
    let mut chained = ChainedSet::with_hasher(state);
    let mut hashbrown = HashbrownSet::with_hasher(state);
    for key in keys {
        chained.insert(key);
        hashbrown.insert(key.as_str().into());
    }
    (chained, hashbrown)
}

fn bench_insert_random<K: KeyFormat, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = OsRng;
    let state = SipState::default();

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = (0..size)
            .map(|_| K::key(rng.try_next_u64().unwrap()))
            .collect::<Vec<String>>();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("string_set", |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut set = ChainedSet::with_hasher(state);
                    for key in &keys {
                        black_box(set.insert(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut set = HashbrownSet::with_hasher(state);
                    for key in &keys {
                        black_box(set.insert(key.as_str().into()));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_insert_reserved<K: KeyFormat, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_reserved_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let state = SipState::default();

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = (0..size as u64).map(K::key).collect::<Vec<String>>();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("string_set", |b| {
            b.iter_batched(
                || ChainedSet::with_capacity_and_hasher(size, state),
                |mut set| {
                    for key in &keys {
                        black_box(set.insert(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || HashbrownSet::with_capacity_and_hasher(size, state),
                |mut set| {
                    for key in &keys {
                        black_box(set.insert(key.as_str().into()));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_contains_hit_miss<K: KeyFormat, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "contains_hit_miss_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let state = SipState::default();

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hits = (0..size as u64 * 2)
            .step_by(2)
            .map(K::key)
            .collect::<Vec<String>>();
        let (chained, hashbrown) = filled(&hits, state);

        let mut probes = (0..size as u64 * 2).map(K::key).collect::<Vec<String>>();
        probes.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function("string_set", |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(chained.contains(key));
                }
            })
        });

        group.bench_function("hashbrown", |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(hashbrown.contains(key.as_str()));
                }
            })
        });
    }

    group.finish();
}

fn bench_contains_zipf<K: KeyFormat, const MAX_SIZE: usize>(c: &mut Criterion) {
    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!(
            "contains_zipf_{:.01}_{}",
            exponent,
            core::any::type_name::<K>()
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        let state = SipState::default();

        for &size in SIZES[..=MAX_SIZE].iter() {
            let keys = (0..size as u64).map(K::key).collect::<Vec<String>>();
            let (chained, hashbrown) = filled(&keys, state);

            let mut rng = SmallRng::from_os_rng();
            let distr = Zipf::new(size as f64 * 2.0, exponent).unwrap();
            let probes = (0..size)
                .map(|_| K::key(rng.sample(distr) as u64 - 1))
                .collect::<Vec<String>>();

            group.throughput(Throughput::Elements(size as u64));
            group.bench_function("string_set", |b| {
                b.iter(|| {
                    for key in &probes {
                        black_box(chained.contains(key));
                    }
                })
            });

            group.bench_function("hashbrown", |b| {
                b.iter(|| {
                    for key in &probes {
                        black_box(hashbrown.contains(key.as_str()));
                    }
                })
            });
        }

        group.finish();
    }
}

fn bench_remove<K: KeyFormat, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let state = SipState::default();

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = (0..size as u64).map(K::key).collect::<Vec<String>>();
        let (chained, hashbrown) = filled(&keys, state);

        let mut order = keys.clone();
        order.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("string_set", |b| {
            b.iter_batched(
                || chained.clone(),
                |mut set| {
                    for key in &order {
                        black_box(set.remove(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut set| {
                    for key in &order {
                        black_box(set.remove(key.as_str()));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_full_scan<K: KeyFormat, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("full_scan_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let state = SipState::default();

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = (0..size as u64).map(K::key).collect::<Vec<String>>();
        let (chained, hashbrown) = filled(&keys, state);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("string_set_scan", |b| {
            b.iter(|| {
                let mut cursor = 0;
                loop {
                    cursor = chained.scan(cursor, |v| {
                        black_box(v);
                    });
                    if cursor == 0 {
                        break;
                    }
                }
            })
        });

        group.bench_function("string_set_iter", |b| {
            b.iter(|| {
                for value in chained.iter() {
                    black_box(value);
                }
            })
        });

        group.bench_function("hashbrown_iter", |b| {
            b.iter(|| {
                for value in hashbrown.iter() {
                    black_box(value);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<ShortKey, 8>,
    bench_insert_random::<PaddedKey, 8>,
    bench_insert_random::<LongKey, 5>,
    bench_insert_reserved::<ShortKey, 8>,
    bench_insert_reserved::<PaddedKey, 8>,
    bench_insert_reserved::<LongKey, 5>,
    bench_contains_hit_miss::<ShortKey, 8>,
    bench_contains_hit_miss::<PaddedKey, 8>,
    bench_contains_hit_miss::<LongKey, 5>,
    bench_contains_zipf::<ShortKey, 8>,
    bench_contains_zipf::<PaddedKey, 8>,
    bench_contains_zipf::<LongKey, 5>,
    bench_remove::<ShortKey, 8>,
    bench_remove::<PaddedKey, 8>,
    bench_remove::<LongKey, 5>,
    bench_full_scan::<ShortKey, 8>,
    bench_full_scan::<PaddedKey, 8>,
    bench_full_scan::<LongKey, 5>,
);

criterion_main!(benches);
