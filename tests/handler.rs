extern crate env_logger;
extern crate failure;
extern crate rand;
extern crate raylights;

use std::rc::Rc;

use rand::Rng;
use raylights::math::{Matrix4, Vector2, Vector4};
use raylights::prelude::*;

fn setup(settings: LightingSettings, mode: LightingMode) -> (HeadlessRecorder, RayHandler) {
    let _ = env_logger::try_init();
    let (video, recorder) = VideoDevice::headless(Vector2::new(800, 600));
    let handler = RayHandler::with_settings(Rc::new(video), Rc::new(mode), None, settings).unwrap();
    (recorder, handler)
}

fn light(handler: &RayHandler, x: f32, y: f32) -> PointLight {
    PointLight::new(
        handler.mode(),
        16,
        Color::white(),
        50.0,
        Vector2::new(x, y),
    )
}

fn labels(cmds: &[HeadlessCommand]) -> Vec<String> {
    cmds.iter()
        .map(|v| {
            let s = format!("{:?}", v);
            s.split('(').next().unwrap_or("").to_owned()
        })
        .collect()
}

fn draws(cmds: &[HeadlessCommand]) -> usize {
    cmds.iter()
        .filter(|v| match v {
            HeadlessCommand::Draw(_, _, _) => true,
            _ => false,
        })
        .count()
}

fn uniform(cmds: &[HeadlessCommand], field: &str) -> Option<UniformVariable> {
    cmds.iter()
        .filter_map(|v| match v {
            HeadlessCommand::SetUniform(name, variable) if name == field => Some(*variable),
            _ => None,
        })
        .last()
}

fn blend_func(func: BlendFunc) -> HeadlessCommand {
    HeadlessCommand::BlendFunc(func.src, func.dst)
}

struct Broken;

impl Light for Broken {
    fn update(&mut self, _: &RayHandler) {}

    fn render(&mut self, _: &RayHandler) -> Result<()> {
        Err(failure::err_msg("broken light"))
    }
}

#[test]
fn bounds() {
    let mut rng = rand::thread_rng();
    let (_, mut handler) = setup(LightingSettings::default(), LightingMode::default());

    for _ in 0..100 {
        let x = rng.gen_range(-1000.0, 1000.0);
        let y = rng.gen_range(-1000.0, 1000.0);
        let w = rng.gen_range(1.0, 500.0);
        let h = rng.gen_range(1.0, 500.0);

        let mut camera = OrthoCamera::new(w, h);
        camera.position = Vector2::new(x, y);
        handler.set_camera(&camera);

        let bounds = handler.bounds();
        assert_eq!(bounds.x1, x - w * 0.5);
        assert_eq!(bounds.x2, x + w * 0.5);
        assert_eq!(bounds.y1, y - h * 0.5);
        assert_eq!(bounds.y2, y + h * 0.5);
        assert_eq!(handler.combined(), &camera.combined());
    }
}

#[test]
fn intersect() {
    let (_, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_combined_matrix_with(Matrix4::from_scale(1.0), 0.0, 0.0, 200.0, 100.0);

    assert!(handler.intersect(0.0, 0.0, 1.0));
    assert!(handler.intersect(150.0, 0.0, 60.0));
    assert!(!handler.intersect(150.0, 0.0, 50.0));
    assert!(!handler.intersect(0.0, -80.0, 30.0));
    assert!(handler.intersect(-120.0, 70.0, 30.0));
}

#[test]
fn ambient() {
    let (_, mut handler) = setup(LightingSettings::default(), LightingMode::default());

    handler.set_ambient_light(-0.5);
    assert_eq!(handler.ambient().a, 0.0);
    handler.set_ambient_light(1.7);
    assert_eq!(handler.ambient().a, 1.0);
    handler.set_ambient_light(0.4);
    assert_eq!(handler.ambient().a, 0.4);

    handler.set_ambient_rgba(2.0, -1.0, 0.5, 0.25);
    assert_eq!(handler.ambient(), Color::new(1.0, 0.0, 0.5, 0.25));
}

#[test]
fn counter() {
    let (_, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let mut lights = vec![
        light(&handler, 0.0, 0.0),
        light(&handler, 5000.0, 0.0),
        light(&handler, 100.0, -100.0),
        light(&handler, 0.0, -5000.0),
        light(&handler, -390.0, 290.0),
    ];

    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.lights_rendered(), 3);
    assert!(lights[1].is_culled());
    assert!(!lights[4].is_culled());

    lights[0].set_active(false);
    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.lights_rendered(), 2);

    handler.set_culling(false);
    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.lights_rendered(), 4);
}

#[test]
fn empty() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    recorder.clear();

    let mut lights: Vec<PointLight> = Vec::new();
    handler.update(&mut lights);
    handler.prepare_render(&mut lights).unwrap();

    assert_eq!(handler.lights_rendered(), 0);
    assert_eq!(handler.state(), PassState::Accumulated);

    let cmds = recorder.commands();
    assert_eq!(draws(&cmds), 0);
    assert!(!cmds.contains(&HeadlessCommand::Blend(false)));
}

#[test]
fn resize_fbo() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    assert_eq!(handler.light_map_dimensions(), Some(Vector2::new(200, 150)));

    handler.resize_fbo(320, 240).unwrap();
    handler.resize_fbo(64, 32).unwrap();

    assert_eq!(recorder.alive_surfaces(), 2);
    assert_eq!(recorder.alive_render_textures(), 2);
    assert_eq!(handler.light_map_dimensions(), Some(Vector2::new(64, 32)));

    let texture = handler.light_map_texture().unwrap();
    assert_eq!(
        recorder.render_texture_dimensions(texture),
        Some(Vector2::new(64, 32))
    );
}

#[test]
fn viewport() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    let mut lights = vec![light(&handler, 0.0, 0.0)];

    handler.use_custom_viewport(10, 20, 780, 560);
    handler.update_and_render(&mut lights).unwrap();
    {
        let cmds = recorder.commands();
        let i = cmds
            .iter()
            .rposition(|v| *v == HeadlessCommand::BindSurface(None))
            .unwrap();

        assert_eq!(
            cmds[i + 1],
            HeadlessCommand::UpdateViewport(SurfaceViewport::new(10, 20, 780, 560))
        );
    }

    recorder.clear();
    handler.use_default_viewport();
    handler.update_and_render(&mut lights).unwrap();

    let cmds = recorder.commands();
    let i = cmds
        .iter()
        .rposition(|v| *v == HeadlessCommand::BindSurface(None))
        .unwrap();

    assert_eq!(
        cmds[i + 1],
        HeadlessCommand::UpdateViewport(SurfaceViewport::new(0, 0, 800, 600))
    );
}

#[test]
fn dispose() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    {
        let mut lights = vec![light(&handler, 0.0, 0.0)];
        handler.update_and_render(&mut lights).unwrap();
        assert_eq!(recorder.alive_meshes(), 2);
    }

    handler.dispose();
    assert_eq!(recorder.alive_surfaces(), 0);
    assert_eq!(recorder.alive_render_textures(), 0);
    assert_eq!(recorder.alive_shaders(), 0);
    assert_eq!(recorder.alive_meshes(), 0);
    assert!(handler.light_map_texture().is_none());

    recorder.clear();
    handler.dispose();
    drop(handler);
    assert!(recorder.commands().is_empty());
}

#[test]
fn culled_frame() {
    let (video, recorder) = VideoDevice::headless(Vector2::new(800, 600));
    let mode = Rc::new(LightingMode::default());
    let mut handler = RayHandler::with_target_size(Rc::new(video), mode, None, 100, 100).unwrap();
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let mut lights = vec![
        light(&handler, 2000.0, 0.0),
        light(&handler, 0.0, 2000.0),
        light(&handler, -2000.0, -2000.0),
    ];

    let frame = handler.light_map_surface().unwrap();
    recorder.clear();
    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.lights_rendered(), 0);

    let cmds = recorder.commands();
    let begin = cmds
        .iter()
        .position(|v| *v == HeadlessCommand::BindSurface(Some(frame)))
        .unwrap();

    let end = cmds
        .iter()
        .position(|v| *v == HeadlessCommand::BindSurface(None))
        .unwrap();

    assert!(begin < end);
    assert_eq!(
        cmds[begin + 1],
        HeadlessCommand::UpdateViewport(SurfaceViewport::new(0, 0, 100, 100))
    );

    assert_eq!(draws(&cmds[begin..end]), 0);
    assert_eq!(recorder.alive_meshes(), 1);
}

#[test]
fn empty_frame() {
    let (video, recorder) = VideoDevice::headless(Vector2::new(800, 600));
    let mode = Rc::new(LightingMode::default());
    let mut handler = RayHandler::with_target_size(Rc::new(video), mode, None, 100, 100).unwrap();
    handler.set_combined_matrix_with(Matrix4::from_scale(1.0), 0.0, 0.0, 800.0, 600.0);

    let frame = handler.light_map_surface().unwrap();
    recorder.clear();

    let mut lights: Vec<AnyLight> = Vec::new();
    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.lights_rendered(), 0);

    let cmds = recorder.commands();
    let begin = cmds
        .iter()
        .position(|v| *v == HeadlessCommand::BindSurface(Some(frame)))
        .unwrap();

    let end = cmds
        .iter()
        .position(|v| *v == HeadlessCommand::BindSurface(None))
        .unwrap();

    assert_eq!(draws(&cmds[begin..end]), 0);

    // No blur, the only blending switch is the one after the composite.
    let blends: Vec<_> = cmds
        .iter()
        .filter(|v| match v {
            HeadlessCommand::Blend(_) => true,
            _ => false,
        })
        .collect();

    assert_eq!(
        blends,
        vec![&HeadlessCommand::Blend(true), &HeadlessCommand::Blend(false)]
    );
}

#[cfg(debug_assertions)]
#[test]
#[should_panic]
fn render_only_before_prepare() {
    let (_, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    let _ = handler.render_only();
}

#[test]
fn sequence() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    handler.set_ambient_rgba(0.5, 0.25, 1.0, 0.5);

    let mut lights = vec![light(&handler, 0.0, 0.0)];
    handler.update_and_render(&mut lights).unwrap();
    recorder.clear();
    handler.update_and_render(&mut lights).unwrap();

    let expected = vec![
        // Accumulation.
        "DepthWrite",
        "Blend",
        "BlendFunc",
        "BindSurface",
        "UpdateViewport",
        "Clear",
        "BindShader",
        "SetUniform",
        "UpdateVertexBuffer",
        "BlendFunc",
        "Draw",
        "BindShader",
        "BindSurface",
        "UpdateViewport",
        // Blur.
        "Blend",
        "BindSurface",
        "UpdateViewport",
        "BindShader",
        "SetUniform",
        "SetUniform",
        "SetUniform",
        "Draw",
        "BindShader",
        "BindSurface",
        "UpdateViewport",
        "BindShader",
        "SetUniform",
        "SetUniform",
        "SetUniform",
        "Draw",
        "BindShader",
        "BindSurface",
        "UpdateViewport",
        "Blend",
        // Composite.
        "BlendFunc",
        "BindShader",
        "SetUniform",
        "SetUniform",
        "Draw",
        "BindShader",
        "Blend",
    ];

    let cmds = recorder.commands();
    assert_eq!(labels(&cmds), expected);

    let frame = handler.light_map_surface().unwrap();
    assert_eq!(cmds[0], HeadlessCommand::DepthWrite(false));
    assert_eq!(cmds[1], HeadlessCommand::Blend(true));
    assert_eq!(cmds[2], blend_func(BlendFunc::SIMPLE));
    assert_eq!(cmds[3], HeadlessCommand::BindSurface(Some(frame)));
    assert_eq!(
        cmds[4],
        HeadlessCommand::UpdateViewport(SurfaceViewport::new(0, 0, 200, 150))
    );

    assert_eq!(cmds[5], HeadlessCommand::Clear(Color::transparent()));
    assert_eq!(cmds[6], HeadlessCommand::BindShader(handler.light_shader()));
    assert_eq!(cmds[9], blend_func(BlendFunc::SIMPLE));
    assert_eq!(cmds[14], HeadlessCommand::Blend(false));
    assert_eq!(cmds[33], HeadlessCommand::Blend(true));
    assert_eq!(cmds[34], blend_func(BlendFunc::SHADOW));
    assert_eq!(cmds[40], HeadlessCommand::Blend(false));

    let texture = handler.light_map_texture().unwrap();
    assert_eq!(
        uniform(&cmds, "u_texture"),
        Some(UniformVariable::RenderTexture(texture))
    );

    assert_eq!(
        uniform(&cmds, "u_ambient"),
        Some(UniformVariable::from(Vector4::new(0.25f32, 0.125, 0.5, 0.5)))
    );

    assert_eq!(handler.state(), PassState::Composited);
}

#[test]
fn diffuse_composite() {
    let (recorder, mut handler) =
        setup(LightingSettings::default(), LightingMode::new(false, true));
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    handler.set_ambient_rgba(0.5, 0.25, 1.0, 0.5);

    let mut lights = vec![light(&handler, 0.0, 0.0)];
    handler.update_and_render(&mut lights).unwrap();

    let cmds = recorder.commands();
    let n = cmds.len();
    assert_eq!(cmds[n - 7], blend_func(BlendFunc::DIFFUSE));
    assert_eq!(
        uniform(&cmds, "u_ambient"),
        Some(UniformVariable::from(Color::new(0.5, 0.25, 1.0, 0.5)))
    );

    // Lights accumulate additively even in diffuse mode.
    assert!(!cmds[..n - 7].contains(&blend_func(BlendFunc::DIFFUSE)));
}

#[test]
fn without_shadows() {
    let settings = LightingSettings {
        shadows: false,
        ..Default::default()
    };

    let (recorder, mut handler) = setup(settings, LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let mut lights = vec![light(&handler, 0.0, 0.0)];
    handler.update_and_render(&mut lights).unwrap();

    {
        let cmds = recorder.commands();
        let n = cmds.len();
        assert_eq!(labels(&cmds[n - 6..]), vec![
            "BlendFunc",
            "BindShader",
            "SetUniform",
            "Draw",
            "BindShader",
            "Blend",
        ]);

        assert_eq!(cmds[n - 6], blend_func(BlendFunc::SIMPLE));
        assert!(uniform(&cmds, "u_ambient").is_none());
        assert_eq!(draws(&cmds), 1 + 2 + 1);
    }

    // Nothing accumulated, nothing composited.
    recorder.clear();
    lights[0].set_position(Vector2::new(9000.0, 9000.0));
    handler.update_and_render(&mut lights).unwrap();

    let cmds = recorder.commands();
    assert_eq!(draws(&cmds), 0);
    assert_eq!(cmds.last(), Some(&HeadlessCommand::Blend(false)));
}

#[test]
fn without_light_map() {
    let settings = LightingSettings {
        shadows: false,
        blur: false,
        ..Default::default()
    };

    let (recorder, mut handler) = setup(settings, LightingMode::new(false, true));
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    assert!(!handler.uses_light_map());

    let mut lights = vec![light(&handler, 0.0, 0.0)];
    recorder.clear();
    handler.update_and_render(&mut lights).unwrap();

    let cmds = recorder.commands();
    assert!(cmds.iter().all(|v| match v {
        HeadlessCommand::BindSurface(_) => false,
        _ => true,
    }));

    assert!(cmds.contains(&blend_func(BlendFunc::DIFFUSE)));
    assert_eq!(draws(&cmds), 1);
    assert_eq!(handler.lights_rendered(), 1);
}

#[test]
fn light_map_rendering_disabled() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    handler.set_light_map_rendering(false);

    let mut lights = vec![light(&handler, 0.0, 0.0)];
    handler.update_and_render(&mut lights).unwrap();

    // One light and one blur iteration, no composite.
    let cmds = recorder.commands();
    assert_eq!(draws(&cmds), 3);
    assert_eq!(cmds.last(), Some(&HeadlessCommand::Blend(true)));
    assert_eq!(handler.state(), PassState::Composited);
}

#[test]
fn split_frame() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));
    handler.set_blur_num(0);

    let mut lights = vec![light(&handler, 0.0, 0.0)];
    handler.update(&mut lights);
    assert_eq!(handler.state(), PassState::Updated);

    handler.prepare_render(&mut lights).unwrap();
    assert_eq!(handler.state(), PassState::Accumulated);
    assert!(!recorder.commands().contains(&HeadlessCommand::Blend(false)));

    recorder.clear();
    handler.render_only().unwrap();
    handler.render_only().unwrap();
    assert_eq!(draws(&recorder.commands()), 2);
}

#[test]
fn occluders() {
    let (video, _recorder) = VideoDevice::headless(Vector2::new(800, 600));
    let mut segments = Segments::new();
    segments.add_box(Vector2::new(10.0, -100.0), Vector2::new(20.0, 100.0));

    let world: Rc<dyn OccluderWorld> = Rc::new(segments);
    let mut handler = RayHandler::new(
        Rc::new(video),
        Rc::new(LightingMode::default()),
        Some(world),
    )
    .unwrap();

    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let mut lights = vec![light(&handler, 0.0, 0.0), light(&handler, 0.0, 0.0)];
    lights[1].set_xray(true);
    handler.update(&mut lights);

    // The first ray points along +x.
    let v = &lights[0].vertices()[7..14];
    assert!((v[0] - 10.0).abs() < 1e-4);
    assert!((v[6] - 0.8).abs() < 1e-4);

    let v = &lights[1].vertices()[7..14];
    assert!((v[0] - 50.0).abs() < 1e-4);
    assert_eq!(v[6], 0.0);
}

#[test]
fn failed_light_rebinds_screen() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let frame = handler.light_map_surface().unwrap();
    recorder.clear();

    let mut lights = vec![Broken];
    assert!(handler.update_and_render(&mut lights).is_err());
    assert_eq!(handler.state(), PassState::Idle);

    {
        let cmds = recorder.commands();
        assert!(cmds.contains(&HeadlessCommand::BindSurface(Some(frame))));

        let n = cmds.len();
        assert_eq!(cmds[n - 3], HeadlessCommand::BindShader(None));
        assert_eq!(cmds[n - 2], HeadlessCommand::BindSurface(None));
        assert_eq!(
            cmds[n - 1],
            HeadlessCommand::UpdateViewport(SurfaceViewport::new(0, 0, 800, 600))
        );
    }

    let mut lights: Vec<PointLight> = Vec::new();
    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.state(), PassState::Composited);
}

#[test]
fn failed_draw_is_not_counted() {
    let (recorder, mut handler) = setup(LightingSettings::default(), LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let mut lights = vec![light(&handler, 0.0, 0.0), light(&handler, 10.0, 10.0)];
    recorder.clear();
    handler.update_and_render(&mut lights).unwrap();
    assert_eq!(handler.lights_rendered(), 2);

    let meshes: Vec<_> = recorder
        .commands()
        .iter()
        .filter_map(|v| match v {
            HeadlessCommand::CreateMesh(mesh) => Some(*mesh),
            _ => None,
        })
        .collect();

    assert_eq!(meshes.len(), 2);
    handler.video().delete_mesh(meshes[1]);

    recorder.clear();
    assert!(handler.update_and_render(&mut lights).is_err());
    assert_eq!(handler.lights_rendered(), 1);
    assert_eq!(draws(&recorder.commands()), 1);
}

#[test]
fn xray_lights_blend_alike() {
    let settings = LightingSettings {
        blur: false,
        ..Default::default()
    };

    let (recorder, mut handler) = setup(settings, LightingMode::default());
    handler.set_camera(&OrthoCamera::new(800.0, 600.0));

    let mut lights = vec![light(&handler, 0.0, 0.0), light(&handler, 10.0, 10.0)];
    lights[1].set_xray(true);
    recorder.clear();
    handler.update_and_render(&mut lights).unwrap();

    let funcs: Vec<_> = recorder
        .commands()
        .iter()
        .filter(|v| match v {
            HeadlessCommand::BlendFunc(_, _) => true,
            _ => false,
        })
        .cloned()
        .collect();

    // Pass entry, one per light, then the composite.
    assert_eq!(
        funcs,
        vec![
            blend_func(BlendFunc::SIMPLE),
            blend_func(BlendFunc::SIMPLE),
            blend_func(BlendFunc::SIMPLE),
            blend_func(BlendFunc::SHADOW),
        ]
    );
}
