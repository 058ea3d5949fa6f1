extern crate raylights;

use std::rc::Rc;

use raylights::math::Vector2;
use raylights::prelude::*;

#[test]
fn mixed_lights() {
    let (video, recorder) = VideoDevice::headless(Vector2::new(640, 480));
    let mode = Rc::new(LightingMode::new(true, false));
    let mut system: LightingSystem<AnyLight> = LightingSystem::new(
        Rc::new(video),
        mode.clone(),
        None,
        OrthoCamera::new(640.0, 480.0),
    )
    .unwrap();

    let point = PointLight::new(&mode, 32, Color::white(), 100.0, Vector2::new(0.0, 0.0));
    let cone = ConeLight::new(
        &mode,
        16,
        Color::new(1.0, 0.5, 0.0, 1.0),
        200.0,
        Vector2::new(0.0, 0.0),
        90.0,
        30.0,
    );

    let transform = Transform2::new(Vector2::new(-50.0, -50.0), Vector2::new(100.0, 20.0));
    let point = system.add(LightObject::with_transform(point.into(), transform));
    let cone = system.add(LightObject::new(cone.into()));

    system.use_blur(true, 2);
    system.resize(640.0, 480.0, 0.0, 40.0);
    system.update().unwrap();

    assert_eq!(system.handler().lights_rendered(), 2);
    assert_eq!(
        system.get(point).unwrap().light.position(),
        Vector2::new(0.0, -40.0)
    );

    // A fan mesh per light, plus the quad of the light map.
    assert_eq!(recorder.alive_meshes(), 3);
    assert_eq!(
        system.handler().viewport(),
        SurfaceViewport::new(0, 40, 640, 400)
    );

    // The camera moves away from the cone.
    system.camera_mut().position = Vector2::new(0.0, -2000.0);
    system.update().unwrap();
    assert_eq!(system.handler().lights_rendered(), 0);
    assert!(system.get(cone).unwrap().light.fan().is_culled());

    system.dispose();
    assert_eq!(recorder.alive_surfaces(), 0);

    drop(system);
    assert_eq!(recorder.alive_meshes(), 0);
}
