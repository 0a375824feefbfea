use std::error::Error;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod identify;

/// Frames from `f3` up to and including `main`'s return into std. Going any
/// deeper reads frames of the precompiled runtime, which may not keep frame
/// pointers.
const DEFAULT_DEPTH: usize = 5;
const MAX_DEPTH: usize = 64;

fn main() -> Result<(), Box<dyn Error>> {
    let registry = tracing_subscriber::Registry::default().with(
        EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .from_env()?,
    );

    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_targets(true)
        .with_bracketed_fields(true);

    registry.with(tree_layer).init();

    let depth = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?.min(MAX_DEPTH),
        None => DEFAULT_DEPTH,
    };

    let mut buffer = [0usize; MAX_DEPTH];
    let count = f0(&mut buffer[..depth]);
    info!(captured = count, requested = depth, "walk finished");

    for (i, &addr) in buffer[..count].iter().enumerate() {
        match identify::identify(addr) {
            Some(symbol) => info!(
                "{i:>2} {addr:#018x} {}+{:#x} ({})",
                symbol
                    .name
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_else(|| "<unknown>".into()),
                symbol.offset,
                symbol
                    .object
                    .map(|object| object.to_string_lossy())
                    .unwrap_or_else(|| "<unknown>".into()),
            ),
            None => info!("{i:>2} {addr:#018x} <not in any loaded object>"),
        }
    }

    Ok(())
}

#[inline(never)]
fn f0(buffer: &mut [usize]) -> usize {
    std::hint::black_box(f1(buffer))
}

#[inline(never)]
fn f1(buffer: &mut [usize]) -> usize {
    std::hint::black_box(f2(buffer))
}

#[inline(never)]
fn f2(buffer: &mut [usize]) -> usize {
    std::hint::black_box(f3(buffer))
}

#[inline(never)]
fn f3(buffer: &mut [usize]) -> usize {
    std::hint::black_box(framewalk::capture(buffer))
}
