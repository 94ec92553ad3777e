//! End-to-end register-to-host state translation, observed through the
//! packed state captured at each draw.

mod common;

use common::{recording_engine, Event, RecordingBackend};
use gm20b_3d::{regs, EngineError, Maxwell3d, PackedPipelineState};
use pretty_assertions::assert_eq;

const BEGIN_TRIANGLES: u32 = regs::DrawTopology::Triangles as u32;

fn draw(engine: &mut Maxwell3d<RecordingBackend>, begin: u32) {
    engine.write(regs::DRAW_BEGIN, begin).unwrap();
    engine.write(regs::DRAW_VERTEX_ARRAY_COUNT, 3).unwrap();
    engine.write(regs::DRAW_END, 0).unwrap();
    engine.flush().unwrap();
}

fn last_state(engine: &Maxwell3d<RecordingBackend>) -> &PackedPipelineState {
    engine
        .backend()
        .draw_states
        .last()
        .unwrap_or_else(|| panic!("no draw was submitted"))
}

#[test]
fn depth_func_accepts_both_hardware_numberings() {
    let mut engine = recording_engine();

    engine.write(regs::DEPTH_TEST_ENABLE, 1).unwrap();
    engine.write(regs::DEPTH_FUNC, 4).unwrap(); // D3D LessEqual
    draw(&mut engine, BEGIN_TRIANGLES);
    engine.write(regs::DEPTH_FUNC, 0x203).unwrap(); // OGL LessEqual
    draw(&mut engine, BEGIN_TRIANGLES);

    let states = &engine.backend().draw_states;
    assert_eq!(states[0].depth_func, wgpu::CompareFunction::LessEqual);
    assert_eq!(states[0], states[1]);
}

#[test]
fn invalid_depth_func_fails_at_submission() {
    let mut engine = recording_engine();

    engine.write(regs::DEPTH_FUNC, 0x999).unwrap();
    engine.write(regs::DRAW_BEGIN, BEGIN_TRIANGLES).unwrap();
    engine.write(regs::DRAW_VERTEX_ARRAY_COUNT, 3).unwrap();
    engine.write(regs::DRAW_END, 0).unwrap();

    assert!(matches!(
        engine.flush(),
        Err(EngineError::InvalidEnum { what, .. }) if what == "compare function"
    ));
}

#[test]
fn back_stencil_uses_its_own_registers_only_when_two_sided() {
    let mut engine = recording_engine();

    engine.write(regs::STENCIL_ENABLE, 1).unwrap();
    engine
        .write(regs::STENCIL_BACK_OP_FAIL, regs::stencil_op::OGL_INVERT)
        .unwrap();
    engine
        .write(regs::STENCIL_BACK_FUNC, regs::compare_func::D3D_NEVER)
        .unwrap();

    draw(&mut engine, BEGIN_TRIANGLES);
    let one_sided = last_state(&engine).clone();
    assert_eq!(one_sided.stencil_back, one_sided.stencil_front);

    engine.write(regs::STENCIL_TWO_SIDE_ENABLE, 1).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    let two_sided = last_state(&engine);
    assert_eq!(two_sided.stencil_back.fail, wgpu::StencilOperation::Invert);
    assert_eq!(two_sided.stencil_back.func, wgpu::CompareFunction::Never);
    assert_eq!(two_sided.stencil_front, one_sided.stencil_front);
}

#[test]
fn per_target_blend_registers_apply_when_independent() {
    let mut engine = recording_engine();
    use gm20b_3d::regs::blend_per_target as bpt;

    engine.write(regs::blend::ENABLE_BASE + 1, 1).unwrap();
    engine
        .write(bpt::reg(1, bpt::OP_RGB), regs::blend_op::OGL_MIN)
        .unwrap();
    engine
        .write(bpt::reg(1, bpt::SRC_RGB), regs::blend_factor::OGL_SRC_ALPHA)
        .unwrap();

    // Independent blending off: the common registers win.
    draw(&mut engine, BEGIN_TRIANGLES);
    let common = last_state(&engine).attachment_blends[1];
    assert_eq!(common.color_op, wgpu::BlendOperation::Add);
    assert_eq!(common.src_color, wgpu::BlendFactor::One);
    assert!(common.enable);

    engine.write(regs::BLEND_INDEPENDENT_ENABLE, 1).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    let independent = last_state(&engine).attachment_blends[1];
    assert_eq!(independent.color_op, wgpu::BlendOperation::Min);
    assert_eq!(independent.src_color, wgpu::BlendFactor::SrcAlpha);
}

#[test]
fn cull_state_translates_with_the_front_and_back_fallback() {
    let mut engine = recording_engine();

    engine.write(regs::CULL_ENABLE, 1).unwrap();
    engine
        .write(regs::CULL_FACE, regs::face::CULL_FRONT)
        .unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(last_state(&engine).cull_mode, Some(wgpu::Face::Front));

    // FrontAndBack has no host equivalent.
    engine
        .write(regs::CULL_FACE, regs::face::CULL_FRONT_AND_BACK)
        .unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(last_state(&engine).cull_mode, Some(wgpu::Face::Back));

    engine.write(regs::CULL_ENABLE, 0).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(last_state(&engine).cull_mode, None);
}

#[test]
fn lower_left_window_origin_flips_the_winding() {
    let mut engine = recording_engine();

    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(last_state(&engine).front_face, wgpu::FrontFace::Ccw);
    assert!(!last_state(&engine).flip_y);

    engine.write(regs::WINDOW_ORIGIN, 1).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(last_state(&engine).front_face, wgpu::FrontFace::Cw);
    assert!(last_state(&engine).flip_y);
}

#[test]
fn quad_draws_request_cpu_conversion() {
    let mut engine = recording_engine();

    draw(&mut engine, regs::DrawTopology::Quads as u32);
    let state = last_state(&engine);
    assert_eq!(state.topology, wgpu::PrimitiveTopology::TriangleList);
    assert!(state.needs_quad_conversion);
    assert!(!state.needs_fan_emulation);

    draw(&mut engine, regs::DrawTopology::TriangleFan as u32);
    assert!(last_state(&engine).needs_fan_emulation);
}

#[test]
fn topology_override_takes_precedence_over_begin() {
    let mut engine = recording_engine();

    engine
        .write(regs::TOPOLOGY_OVERRIDE, regs::DrawTopology::Points as u32)
        .unwrap();
    engine.write(regs::TOPOLOGY_OVERRIDE_CONTROL, 1).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(
        last_state(&engine).topology,
        wgpu::PrimitiveTopology::PointList
    );
}

#[test]
fn vertex_streams_and_attributes_reach_the_packed_state() {
    let mut engine = recording_engine();
    use gm20b_3d::regs::vertex_stream as vs;

    // Stream 2: enabled, 32-byte stride, instanced with divisor 4.
    engine
        .write(vs::reg(2, vs::CONTROL), 32 | 1 << 12)
        .unwrap();
    engine.write(vs::reg(2, vs::FREQUENCY), 4).unwrap();
    engine
        .write(regs::VERTEX_STREAM_INSTANCE_BASE + 2, 1)
        .unwrap();

    // Attribute 3: stream 2, offset 16, rgba8 unorm.
    let attribute = 2
        | 16 << 7
        | regs::attribute_size::SIZE_8_8_8_8 << 21
        | regs::attribute_type::UNORM << 27;
    engine
        .write(regs::VERTEX_ATTRIBUTE_BASE + 3, attribute)
        .unwrap();

    draw(&mut engine, BEGIN_TRIANGLES);
    let state = last_state(&engine);

    let binding = state.vertex_bindings[2];
    assert!(binding.enable);
    assert_eq!(binding.stride, 32);
    assert!(binding.instanced);
    assert_eq!(binding.divisor, 4);

    let packed = state.vertex_attributes[3];
    assert!(packed.enable);
    assert_eq!(packed.stream, 2);
    assert_eq!(packed.offset, 16);
    assert_eq!(packed.format, wgpu::VertexFormat::Unorm8x4);
}

#[test]
fn render_targets_resolve_views_and_formats() {
    let mut engine = recording_engine();
    use gm20b_3d::regs::color_target as ct;

    engine
        .write(ct::reg(0, ct::FORMAT), regs::ct_format::A8B8G8R8)
        .unwrap();
    engine.write(ct::reg(0, ct::WIDTH), 1280).unwrap();
    engine.write(ct::reg(0, ct::HEIGHT), 720).unwrap();
    engine.write(regs::RT_CONTROL, 1).unwrap();

    engine.write(regs::ZT_SELECT, 1).unwrap();
    engine
        .write(regs::zt::FORMAT, regs::zt_format::Z24S8)
        .unwrap();
    engine.write(regs::zt::WIDTH, 1280).unwrap();
    engine.write(regs::zt::HEIGHT, 720).unwrap();

    draw(&mut engine, BEGIN_TRIANGLES);

    let state = last_state(&engine);
    assert_eq!(state.color_formats[0], Some(wgpu::TextureFormat::Rgba8Unorm));
    assert_eq!(
        state.depth_format,
        Some(wgpu::TextureFormat::Depth24PlusStencil8)
    );

    let events = &engine.backend().events;
    let Event::Draw {
        color_attachments,
        has_depth,
        ..
    } = &events[0]
    else {
        panic!("expected a draw, got {events:?}");
    };
    assert_eq!(*color_attachments, 1);
    assert!(*has_depth);

    // Dropping the depth target takes effect on the next draw.
    engine.write(regs::ZT_SELECT, 0).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);
    assert_eq!(last_state(&engine).depth_format, None);
    let Event::Draw { has_depth, .. } = engine.backend().events.last().unwrap() else {
        panic!("expected a draw");
    };
    assert!(!*has_depth);
}

#[test]
fn cache_keys_split_exactly_on_state_differences() {
    let mut engine = recording_engine();

    draw(&mut engine, BEGIN_TRIANGLES);
    draw(&mut engine, BEGIN_TRIANGLES);
    engine.write(regs::DEPTH_WRITE_ENABLE, 1).unwrap();
    draw(&mut engine, BEGIN_TRIANGLES);

    let states = &engine.backend().draw_states;
    assert_eq!(states[0].cache_key(), states[1].cache_key());
    assert_ne!(states[1].cache_key(), states[2].cache_key());
}
