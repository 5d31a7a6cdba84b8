use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use turnstake::{Address, Arena, ArenaConfig, ArenaInput, InMemoryLedger, NoticeLog};

const PLAYERS: u32 = 1_000;

fn player(n: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[16..].copy_from_slice(&n.to_be_bytes());
    Address::from(bytes)
}

fn fresh_arena() -> Arena<InMemoryLedger, NoticeLog> {
    let ledger = InMemoryLedger::with_balances((0..PLAYERS).map(|n| (player(n), 1_000))).unwrap();
    Arena::new(ArenaConfig::testing(), ledger, NoticeLog::new()).unwrap()
}

fn join_inputs() -> Vec<ArenaInput> {
    (0..PLAYERS)
        .map(|n| ArenaInput::JoinRequest {
            player: player(n),
            input_index: n as u64,
        })
        .collect()
}

fn bench_join_and_pair(c: &mut Criterion) {
    c.bench_function("join_and_pair_1000", |b| {
        b.iter_batched(
            || (fresh_arena(), join_inputs()),
            |(mut arena, inputs)| {
                for input in inputs {
                    black_box(arena.advance(input));
                }
                arena
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_state_digest(c: &mut Criterion) {
    let mut arena = fresh_arena();
    for input in join_inputs() {
        arena.advance(input);
    }

    c.bench_function("state_digest_500_games", |b| b.iter(|| black_box(arena.state_digest().unwrap())));
}

criterion_group!(benches, bench_join_and_pair, bench_state_digest);
criterion_main!(benches);
