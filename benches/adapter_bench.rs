use criterion::{black_box, criterion_group, criterion_main, Criterion};
use playhook::backend::HtmlPage;
use playhook::sink::RecordingSink;
use playhook::{ActionEvent, Adapter, AdapterConfig};

const PLAYING: &str = include_str!("../tests/fixtures/playing_player.html");

fn bench_tick(c: &mut Criterion) {
    let adapter = Adapter::new(HtmlPage::new(PLAYING), RecordingSink::new(), AdapterConfig::default())
        .expect("valid config");
    c.bench_function("tick_playing_page", |b| {
        b.iter(|| {
            let snap = adapter.tick();
            adapter.sink().take_events();
            black_box(snap)
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let adapter = Adapter::new(HtmlPage::new(PLAYING), RecordingSink::new(), AdapterConfig::default())
        .expect("valid config");
    let event = ActionEvent::new("next-song");
    c.bench_function("dispatch_next_song", |b| {
        b.iter(|| {
            let out = adapter.handle_action(black_box(&event));
            adapter.dom().take_clicks();
            out
        })
    });
}

criterion_group!(benches, bench_tick, bench_dispatch);
criterion_main!(benches);
