//! WGSL sources for the pipeline passes.
//!
//! Shaders ship as `.wgsl` assets; the simulation shader is composed at
//! pipeline build time by prepending the shared noise functions, the same
//! way raw shader sources get a common prefix before compilation.

/// Texel-for-texel blit used to seed the ping-pong pair.
pub const COPY_WGSL: &str = include_str!("shaders/copy.wgsl");

/// Position update kernel. Requires [`NOISE_WGSL`] prepended; use
/// [`simulation_wgsl`].
pub const SIMULATE_WGSL: &str = include_str!("shaders/simulate.wgsl");

/// Main particle draw (billboard expansion + lighting + shadow lookup).
pub const PARTICLES_WGSL: &str = include_str!("shaders/particles.wgsl");

/// Light-space distance pass for shadow casting.
pub const SHADOW_WGSL: &str = include_str!("shaders/shadow.wgsl");

/// Demo wall draw (lit quad receiving particle shadows).
pub const WALL_WGSL: &str = include_str!("shaders/wall.wgsl");

/// 3-D simplex noise, shared by any shader that needs a procedural field.
pub const NOISE_WGSL: &str = r#"
// 3D simplex noise (Ashima Arts gradient noise, WGSL port).
fn mod289v3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289v4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute4(x: vec4<f32>) -> vec4<f32> {
    return mod289v4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt4(r: vec4<f32>) -> vec4<f32> {
    return 1.79284291400159 - 0.85373472095314 * r;
}

fn noise3(v: vec3<f32>) -> f32 {
    let C = vec2<f32>(1.0 / 6.0, 1.0 / 3.0);
    let D = vec4<f32>(0.0, 0.5, 1.0, 2.0);

    // First corner
    var i = floor(v + dot(v, vec3<f32>(C.y, C.y, C.y)));
    let x0 = v - i + dot(i, vec3<f32>(C.x, C.x, C.x));

    // Other corners
    let g = step(x0.yzx, x0.xyz);
    let l = 1.0 - g;
    let i1 = min(g.xyz, l.zxy);
    let i2 = max(g.xyz, l.zxy);

    let x1 = x0 - i1 + vec3<f32>(C.x, C.x, C.x);
    let x2 = x0 - i2 + vec3<f32>(C.y, C.y, C.y);
    let x3 = x0 - D.yyy;

    // Permutations
    i = mod289v3(i);
    let p = permute4(permute4(permute4(
        i.z + vec4<f32>(0.0, i1.z, i2.z, 1.0))
        + i.y + vec4<f32>(0.0, i1.y, i2.y, 1.0))
        + i.x + vec4<f32>(0.0, i1.x, i2.x, 1.0));

    // Gradients
    let n_ = 0.142857142857;
    let ns = n_ * D.wyz - D.xzx;

    let j = p - 49.0 * floor(p * ns.z * ns.z);

    let x_ = floor(j * ns.z);
    let y_ = floor(j - 7.0 * x_);

    let x = x_ * ns.x + vec4<f32>(ns.y, ns.y, ns.y, ns.y);
    let y = y_ * ns.x + vec4<f32>(ns.y, ns.y, ns.y, ns.y);
    let h = 1.0 - abs(x) - abs(y);

    let b0 = vec4<f32>(x.xy, y.xy);
    let b1 = vec4<f32>(x.zw, y.zw);

    let s0 = floor(b0) * 2.0 + 1.0;
    let s1 = floor(b1) * 2.0 + 1.0;
    let sh = -step(h, vec4<f32>(0.0, 0.0, 0.0, 0.0));

    let a0 = b0.xzyw + s0.xzyw * sh.xxyy;
    let a1 = b1.xzyw + s1.xzyw * sh.zzww;

    var p0 = vec3<f32>(a0.xy, h.x);
    var p1 = vec3<f32>(a0.zw, h.y);
    var p2 = vec3<f32>(a1.xy, h.z);
    var p3 = vec3<f32>(a1.zw, h.w);

    // Normalize gradients
    let norm = taylor_inv_sqrt4(vec4<f32>(dot(p0, p0), dot(p1, p1), dot(p2, p2), dot(p3, p3)));
    p0 = p0 * norm.x;
    p1 = p1 * norm.y;
    p2 = p2 * norm.z;
    p3 = p3 * norm.w;

    // Mix final noise value
    var m = max(0.6 - vec4<f32>(dot(x0, x0), dot(x1, x1), dot(x2, x2), dot(x3, x3)),
        vec4<f32>(0.0, 0.0, 0.0, 0.0));
    m = m * m;
    return 42.0 * dot(m * m, vec4<f32>(dot(p0, x0), dot(p1, x1), dot(p2, x2), dot(p3, x3)));
}
"#;

/// The fully composed simulation shader source.
pub fn simulation_wgsl() -> String {
    format!("{NOISE_WGSL}\n{SIMULATE_WGSL}")
}
