//! Validate every WGSL module with naga, so shader errors surface in CI
//! instead of at device creation.

use naga::valid::{Capabilities, ValidationFlags, Validator};

fn validate(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{label} failed to parse: {e}"));
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .unwrap_or_else(|e| panic!("{label} failed validation: {e:?}"));
}

#[test]
fn test_copy_shader_is_valid() {
    validate("copy.wgsl", morphcloud::shaders::COPY_WGSL);
}

#[test]
fn test_simulation_shader_is_valid() {
    validate("simulate.wgsl", &morphcloud::shaders::simulation_wgsl());
}

#[test]
fn test_particle_shader_is_valid() {
    validate("particles.wgsl", morphcloud::shaders::PARTICLES_WGSL);
}

#[test]
fn test_shadow_shader_is_valid() {
    validate("shadow.wgsl", morphcloud::shaders::SHADOW_WGSL);
}

#[test]
fn test_wall_shader_is_valid() {
    validate("wall.wgsl", morphcloud::shaders::WALL_WGSL);
}
