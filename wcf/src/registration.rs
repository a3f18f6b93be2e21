// wcf/src/registration.rs

use wcf_core::domain::ComponentRegistry;

/// Entry-point list: every third-party factory package contributes one
/// `fn(&mut ComponentRegistry)` here, assembled at link time rather than
/// discovered dynamically. The core itself ships zero concrete connectors,
/// processors, or exporters, so this list is empty in this binary.
pub const BUILTIN_FACTORIES: &[fn(&mut ComponentRegistry)] = &[];

pub fn register_all(registry: &mut ComponentRegistry) {
    for register in BUILTIN_FACTORIES {
        register(registry);
    }
}
