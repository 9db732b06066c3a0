/// WGSL shader for the lit, deforming mesh.
pub const MESH_SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;

struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // rgb = base color, w = metalness
    base_color: vec4<f32>,
    // rgb = emissive * intensity, w = roughness
    emissive: vec4<f32>,
    // rgb = ambient * intensity, w = point light count
    ambient: vec4<f32>,
    // xyz = position, w = range (0 = infinite)
    light_pos: array<vec4<f32>, MAX_LIGHTS>,
    // rgb = color * intensity
    light_color: array<vec4<f32>, MAX_LIGHTS>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = u.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (u.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = u.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = world_normal;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(u.camera_pos.xyz - in.world_pos);

    let base = u.base_color.rgb;
    let metalness = u.base_color.w;
    let roughness = u.emissive.w;
    let diffuse_color = base * (1.0 - metalness);
    let f0 = mix(vec3<f32>(0.04), base, metalness);
    let r4 = max(roughness * roughness * roughness * roughness, 1e-4);
    let shininess = max(2.0 / r4 - 2.0, 1.0);

    var color = u.ambient.rgb * diffuse_color;

    let count = min(u32(u.ambient.w), MAX_LIGHTS);
    for (var i = 0u; i < count; i = i + 1u) {
        let to_light = u.light_pos[i].xyz - in.world_pos;
        let d = length(to_light);
        let l = to_light / max(d, 1e-4);
        let range = u.light_pos[i].w;
        var atten = 1.0;
        if (range > 0.0) {
            atten = clamp(1.0 - d / range, 0.0, 1.0);
        }
        let radiance = u.light_color[i].rgb * atten;

        let n_dot_l = max(dot(n, l), 0.0);
        let h = normalize(l + v);
        let n_dot_h = max(dot(n, h), 0.0);
        let specular = f0 * pow(n_dot_h, shininess) * (shininess + 8.0) / 25.13274;

        color += radiance * n_dot_l * (diffuse_color + specular);
    }

    color += u.emissive.rgb;
    return vec4<f32>(color, 1.0);
}
"#;
