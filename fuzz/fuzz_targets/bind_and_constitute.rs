#![no_main]

use constitute::{Constitutor, Container, ContainerOptions, Instance, Key, Lifetime};
use libfuzzer_sys::fuzz_target;

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

fn key(byte: u8) -> Key {
    Key::named(KEYS[(byte % 4) as usize])
}

fn lifetime(byte: u8) -> Lifetime {
    match byte % 3 {
        0 => Lifetime::Transient,
        1 => Lifetime::Singleton,
        _ => Lifetime::Global,
    }
}

// Each 3-byte chunk is one operation on a small container hierarchy.
// Alias cycles are allowed and must end in DepthExceeded, never a crash.
fuzz_target!(|data: &[u8]| {
    let root = Container::with_options(ContainerOptions::default().with_max_depth(32));
    let child = root.create_child();

    for chunk in data.chunks_exact(3) {
        let (op, a, b) = (chunk[0], chunk[1], chunk[2]);
        let container = if op & 0x80 == 0 { &root } else { &child };

        match op % 8 {
            0 => {
                container.bind_value(key(a), b);
            }
            1 => {
                container.bind_null(key(a));
            }
            2 => {
                container.bind_alias(key(a), key(b), Some(Constitutor::from(lifetime(b >> 2))));
            }
            3 => {
                container.bind_method(
                    key(a),
                    move |_, _| Ok(Instance::new(b)),
                    Some(Constitutor::from(lifetime(b))),
                );
            }
            4 => {
                let _ = container.constitute(&key(a));
            }
            5 => {
                let all = container.constitute_all(&key(a));
                if let Ok(all) = all {
                    assert_eq!(all.len(), container.find_all_factories(&key(a)).len());
                }
            }
            6 => {
                let _ = container.cached_instance(&key(a));
            }
            _ => {
                let best = container.find_best_factory(&key(a));
                assert_eq!(best.is_some(), container.is_bound(&key(a)));
            }
        }
    }
});
