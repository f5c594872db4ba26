use super::*;

fn loaded_frame() -> PhotoFrameScene {
    let mut s = PhotoFrameScene::new();
    s.texture_loaded(PHOTO_FRONT_URL, Ok(())).unwrap();
    s.texture_loaded(PHOTO_BACK_URL, Ok(())).unwrap();
    s
}

#[test]
fn photo_frame_spins_a_dark_box_while_loading() {
    let mut s = PhotoFrameScene::new();
    assert_eq!(s.pending_textures().len(), 2);
    s.tick(Millis(0));
    s.tick(Millis(16));
    let f = s.frame();
    assert_eq!(f.meshes.len(), 1);
    assert_eq!(f.meshes[0].name, "loading-box");
    assert_eq!(f.meshes[0].color.as_deref(), Some("#1f1f1f"));
    assert!((f.meshes[0].yaw - 0.02).abs() < 1e-12);
    assert_eq!(s.yaw(), 0.0);
}

#[test]
fn photo_texture_failure_is_a_construction_fault() {
    let mut s = PhotoFrameScene::new();
    let err = s
        .texture_loaded(PHOTO_BACK_URL, Err("404".to_owned()))
        .unwrap_err();
    assert!(matches!(err, FolioError::Construction(_)));
    assert!(err.escalates());
}

#[test]
fn border_drifts_toward_green_when_back_faces_viewer() {
    let mut s = loaded_frame();
    assert!(s.pending_textures().is_empty());
    // PI/2 / 0.005 = ~314 frames until the back face turns toward the viewer.
    for _ in 0..400 {
        s.tick(Millis(0));
    }
    assert!(!is_front_facing(s.yaw()));
    let b = s.border();
    assert!(b.g > b.b, "border should be greener than blue: {b:?}");
    assert_eq!(s.frame().meshes.len(), 3);
}

#[test]
fn facing_wraps_around_full_turns() {
    assert!(is_front_facing(0.0));
    assert!(is_front_facing(TAU + 0.1));
    assert!(is_front_facing(-0.1));
    assert!(!is_front_facing(PI));
    assert!(!is_front_facing(-PI));
}

#[test]
fn logo_keywords_follow_priority() {
    let icon = |name: &str| {
        let url = logo_url_for(name);
        url.rsplit('/').next().unwrap_or_default().to_owned()
    };
    assert_eq!(icon("React Developer"), "react-original.svg");
    assert_eq!(icon("Backend Systems"), "nodejs-original.svg");
    assert_eq!(icon("Interactive 3D"), "threejs-original.svg");
    assert_eq!(icon("Version Control"), "git-original.svg");
    assert_eq!(icon("Java"), "java-original.svg");
    assert_eq!(icon("JavaScript"), "javascript-original.svg");
    assert_eq!(icon("Next.js"), "nextjs-original.svg");
    assert_eq!(icon("Python"), "python-original.svg");
    assert_eq!(icon("Rust"), "react-original.svg");
}

#[test]
fn logo_failure_degrades_to_placeholder_box() {
    let mut s = TechLogoScene::new("Python");
    let url = s.url().to_owned();
    s.tick(Millis(1_000));
    s.tick(Millis(1_500));
    let loading = s.frame();
    assert_eq!(loading.meshes[0].name, "placeholder-box");
    assert_eq!(loading.meshes[0].color.as_deref(), Some("#10b981"));
    assert!((loading.meshes[0].yaw - (0.5f64 * 0.5).sin() * 0.3).abs() < 1e-12);
    assert_eq!(s.pending_textures(), vec![url.clone()]);

    s.texture_loaded(&url, Err("cors".to_owned())).unwrap();
    let f = s.frame();
    assert_eq!(f.meshes[0].name, "placeholder-box");
    assert_eq!(f.meshes[0].color.as_deref(), Some("#10b981"));
    assert!(s.pending_textures().is_empty());
}

#[test]
fn logo_sways_on_elapsed_time() {
    let mut s = TechLogoScene::new("TypeScript");
    let url = s.url().to_owned();
    s.texture_loaded(&url, Ok(())).unwrap();
    s.tick(Millis(0));
    s.tick(Millis(2_000));
    let expected = (2.0f64 * 0.5).sin() * 0.3;
    let f = s.frame();
    assert_eq!(f.meshes[0].texture.as_deref(), Some(url.as_str()));
    assert!((f.meshes[0].yaw - expected).abs() < 1e-12);
}
