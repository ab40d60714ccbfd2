use criterion::{Criterion, criterion_group, criterion_main};
use weft_engine::{DomToModelContext, ModelToDomContext, NodeIndex, dom_to_model, model_to_dom};
mod common;

fn bench_forward_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_sync");
    group.sample_size(20);

    let (dom, root) = common::generate_surface(50);
    group.bench_function("dom_to_model", |b| {
        b.iter(|| {
            let doc = dom_to_model(&dom, std::hint::black_box(root), &mut DomToModelContext::new());
            std::hint::black_box(doc);
        });
    });

    group.finish();
}

fn bench_reverse_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse_sync");
    group.sample_size(20);

    let (mut dom, root) = common::generate_surface(50);
    let doc = dom_to_model(&dom, root, &mut DomToModelContext::new());

    group.bench_function("fresh_render", |b| {
        b.iter(|| {
            let target = dom.create_element("div");
            let mut doc = doc.clone();
            let selection = model_to_dom(&mut dom, target, &mut doc, &mut ModelToDomContext::new());
            std::hint::black_box(selection);
        });
    });

    // Every block carries a cache hint, so rendering is mostly moves
    let mut index = NodeIndex::new();
    let mut cached = dom_to_model(
        &dom,
        root,
        &mut DomToModelContext::new()
            .with_cache(true)
            .with_indexer(&mut index),
    );
    group.bench_function("cached_render", |b| {
        b.iter(|| {
            let selection = model_to_dom(
                &mut dom,
                root,
                &mut cached,
                &mut ModelToDomContext::new().with_cache(true),
            );
            std::hint::black_box(selection);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_forward_sync, bench_reverse_sync);
criterion_main!(benches);
