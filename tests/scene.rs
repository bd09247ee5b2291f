// tests/scene.rs
use glam::Mat4;
use lsys_mesh::transform::translate;
use lsys_mesh::{
    BONSAI_SYMBOL, BonsaiGenerator, DrawContext, Gallery, HingeRig, Interpreter, LsysError, Mesh,
    ModelMeta, PrimitiveKind, Renderer, RewriteConfig, RuleBook, SNAKE_HINGES, Scene, build_mesh,
    expand, plant_rules, snake_program, tokenize,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f32::consts::{FRAC_PI_2, PI};

#[derive(Default)]
struct RecordingRenderer {
    built: Vec<Mesh>,
    drawn: Vec<(String, Mat4, [f32; 4], bool, bool)>,
}

impl Renderer for RecordingRenderer {
    fn build_model(&mut self, mesh: &Mesh) {
        self.built.push(mesh.clone());
    }

    fn draw_model(
        &mut self,
        name: &str,
        _model_view_projection: &Mat4,
        model: &Mat4,
        rgba: [f32; 4],
        use_lighting: bool,
        backface_cull: bool,
    ) {
        self.drawn
            .push((name.to_owned(), *model, rgba, use_lighting, backface_cull));
    }
}

fn plant_scene() -> Scene {
    Scene::new(plant_rules().unwrap(), Interpreter::default())
}

#[test_log::test]
fn test_models_build_once_and_are_cached() {
    let mut scene = plant_scene();
    let mut renderer = RecordingRenderer::default();
    let ctx = DrawContext::default();

    scene.draw("Tetrahedron F Tetrahedron", Mat4::IDENTITY, Mat4::IDENTITY, &ctx, &mut renderer);
    scene.draw("Tetrahedron", Mat4::IDENTITY, Mat4::IDENTITY, &ctx, &mut renderer);

    assert_eq!(renderer.built.len(), 1);
    assert_eq!(renderer.drawn.len(), 3);

    let tetra = &renderer.built[0];
    assert_eq!(tetra.name, "Tetrahedron");
    // Four faces of three corner points.
    assert_eq!(tetra.vertex_count(), 12);
    assert_eq!(tetra.normals.len(), tetra.vertices.len());
    assert_eq!(tetra.colors.len(), 4 * 12);

    assert_eq!(renderer.drawn[1].1, translate(0.0, 1.0, 0.0));
}

#[test_log::test]
fn test_unknown_sub_models_are_skipped_but_remembered() {
    let mut scene = plant_scene();
    let mut renderer = RecordingRenderer::default();
    let ctx = DrawContext::default();

    scene.draw("noRtt Arrow", Mat4::IDENTITY, Mat4::IDENTITY, &ctx, &mut renderer);
    assert!(renderer.built.is_empty());
    assert!(renderer.drawn.is_empty());
    assert!(scene.cache().contains("noRtt"));
    assert!(scene.cache().get("noRtt").is_none());
}

#[test]
fn test_draw_passes_attributes_and_meta_flags() {
    let mut scene = plant_scene();
    let mut renderer = RecordingRenderer::default();
    let ctx = DrawContext::default();

    scene.draw(
        "Colour255,0,0 LightsOn Prism LightsOff Quad",
        Mat4::IDENTITY,
        Mat4::IDENTITY,
        &ctx,
        &mut renderer,
    );

    let (name, _, rgba, lit, cull) = &renderer.drawn[0];
    assert_eq!(name, "Prism");
    assert_eq!(*rgba, [1.0, 0.0, 0.0, 1.0]);
    assert!(*lit);
    assert!(*cull);

    let (name, _, _, lit, cull) = &renderer.drawn[1];
    assert_eq!(name, "Quad");
    assert!(!*lit);
    assert!(!*cull);

    let prism = scene.cache().get("Prism").unwrap();
    assert!(prism.use_lighting);
    assert!(prism.backface_cull);
    assert_eq!(prism.primitive, PrimitiveKind::Triangles);
    assert_eq!(prism.vertex_count(), 24);
}

#[test]
fn test_invalidate_forces_rebuild() {
    let mut scene = plant_scene();
    let mut renderer = RecordingRenderer::default();

    assert!(scene.ensure_model("Quad", &mut renderer));
    assert!(scene.ensure_model("Quad", &mut renderer));
    assert_eq!(renderer.built.len(), 1);

    assert!(scene.invalidate("Quad"));
    assert!(!scene.invalidate("Quad"));
    assert!(scene.ensure_model("Quad", &mut renderer));
    assert_eq!(renderer.built.len(), 2);
}

#[test]
fn test_line_models_keep_their_primitive_kind() {
    let rules = plant_rules().unwrap();
    let mesh = build_mesh("Koch2", &rules, &Interpreter::default(), &RewriteConfig::default())
        .unwrap();
    assert_eq!(mesh.primitive, PrimitiveKind::Triangles);
    assert_eq!(mesh.vertex_count() % 3, 0);

    let mesh = build_mesh("Sierpinksi", &rules, &Interpreter::default(), &RewriteConfig::default())
        .unwrap();
    assert_eq!(mesh.primitive, PrimitiveKind::LineLoop);
}

#[test]
fn test_bonsai_is_a_fresh_reproducible_rule_book() {
    let generator = BonsaiGenerator::default();
    let a = generator.generate(&mut StdRng::seed_from_u64(42));
    let b = generator.generate(&mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);

    assert!(a.contains(BONSAI_SYMBOL));
    assert_eq!(a.len(), 1);
    assert_eq!(a.depth_of(BONSAI_SYMBOL), 5);

    let group = a.group(BONSAI_SYMBOL).unwrap();
    let root = &group[BONSAI_SYMBOL];
    let angle: f32 = root[0].strip_prefix('A').unwrap().parse().unwrap();
    assert!((0.3..=0.6).contains(&angle));
    assert!(root[1].starts_with("Colour"));
    assert!(group["MyLeaf"][0].starts_with("Colour"));
    assert!(group.contains_key("MyBranch"));
}

#[test_log::test]
fn test_bonsai_expands_to_triangles() {
    let rules = BonsaiGenerator::default().generate(&mut StdRng::seed_from_u64(3));
    let tokens = expand(&[BONSAI_SYMBOL], &rules);
    assert!(!tokens.iter().any(|t| t == BONSAI_SYMBOL));

    let mesh = build_mesh(BONSAI_SYMBOL, &rules, &Interpreter::default(), &RewriteConfig::default())
        .unwrap();
    assert!(mesh.vertex_count() >= 9);
    assert_eq!(mesh.vertex_count() % 3, 0);
    assert_eq!(mesh.normals.len(), mesh.vertices.len());
}

#[test]
fn test_replacing_rules_rebuilds_the_regenerated_model() {
    let generator = BonsaiGenerator::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut scene = Scene::new(generator.generate(&mut rng), Interpreter::default());
    let mut renderer = RecordingRenderer::default();

    assert!(scene.ensure_model(BONSAI_SYMBOL, &mut renderer));
    scene.replace_rules(generator.generate(&mut rng), BONSAI_SYMBOL);
    assert!(!scene.cache().contains(BONSAI_SYMBOL));
    assert!(scene.ensure_model(BONSAI_SYMBOL, &mut renderer));
    assert_eq!(renderer.built.len(), 2);
}

#[test]
fn test_builtin_gallery() {
    let gallery = Gallery::builtin().unwrap();
    let rules = plant_rules().unwrap();
    assert_eq!(gallery.gallery.len(), 15);

    let first = gallery.entry(0).unwrap();
    assert_eq!(first.label, "TETRAHEDRON");
    let t = first.base_transform();
    assert!(t.abs_diff_eq(Mat4::from_scale(glam::Vec3::splat(4.04)), 1e-6));

    // Every exhibit only references models the rule book knows.
    let interpreter = Interpreter::default();
    let ctx = DrawContext::default();
    for entry in &gallery.gallery {
        let calls = interpreter.draw_list(&tokenize(&entry.program), Mat4::IDENTITY, &ctx);
        assert!(!calls.is_empty(), "{} draws nothing", entry.label);
        for call in calls {
            assert!(rules.contains(&call.name), "{} is not a model", call.name);
        }
    }

    assert_eq!(gallery.pattern("snek").map(<[i8]>::len), Some(SNAKE_HINGES));
    assert!(gallery.pattern_names().contains(&"frog"));
}

#[test]
fn test_snake_program_hinges() {
    let program = snake_program(SNAKE_HINGES);
    let tokens = tokenize(&program);
    let hinges = tokens.iter().filter(|t| t.starts_with("Hinge(")).count();
    assert_eq!(hinges, SNAKE_HINGES);
    assert!(tokens.contains(&"Hinge(22)"));
    assert_eq!(tokens.iter().filter(|t| **t == "Prism1").count(), 12);
    assert_eq!(tokens.iter().filter(|t| **t == "Prism").count(), 12);

    let opens = tokens.iter().filter(|t| **t == "[").count();
    let closes = tokens.iter().filter(|t| **t == "]").count();
    assert_eq!(opens, closes);

    let interpreter = Interpreter::default();
    let ctx = DrawContext {
        hinges: HingeRig::new(SNAKE_HINGES).angles().to_vec(),
        ..Default::default()
    };
    let names: Vec<String> = interpreter
        .draw_list(&tokens, Mat4::IDENTITY, &ctx)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names.iter().filter(|n| *n == "Arrow").count(), 2);
    assert_eq!(names.iter().filter(|n| n.starts_with("Prism")).count(), 24);
}

#[test]
fn test_hinge_rig_eases_toward_pattern() {
    let mut rig = HingeRig::new(3);
    assert_eq!(rig.angles(), &[PI; 3]);

    rig.set_pattern(&[-1, 1, 0, 2]);
    assert_eq!(rig.targets(), &[FRAC_PI_2, 3.0 * FRAC_PI_2, PI]);

    rig.step();
    let a = rig.angles();
    assert!((a[0] - (PI - 0.1 * FRAC_PI_2)).abs() < 1e-6);
    assert!((a[1] - (PI + 0.1 * FRAC_PI_2)).abs() < 1e-6);
    assert_eq!(a[2], PI);

    for _ in 0..300 {
        rig.step();
    }
    assert!((rig.angles()[0] - FRAC_PI_2).abs() < 1e-4);
}

#[test]
fn test_rule_book_from_toml_and_json() {
    let toml = r#"
        [rules.X]
        X = ["Y", "Y"]
        Y = ["F"]

        [meta.X]
        iterations = 2
        style = "LINE_STRIP"
    "#;
    let book = RuleBook::from_toml_str(toml).unwrap();
    assert_eq!(book.depth_of("X"), 2);
    assert_eq!(book.meta("X").unwrap().style, PrimitiveKind::LineStrip);
    assert!(!book.meta("X").unwrap().use_lighting);
    assert_eq!(expand(&["X"], &book), ["F", "F"]);

    let json = r#"{"rules": {"X": {"X": ["Y", "Y"], "Y": ["F"]}},
                   "meta": {"X": {"iterations": 2, "style": "LINE_STRIP"}}}"#;
    assert_eq!(RuleBook::from_json_str(json).unwrap(), book);

    let expected = RuleBook::new()
        .with_group("X", [("X", vec!["Y", "Y"]), ("Y", vec!["F"])])
        .with_meta(
            "X",
            ModelMeta {
                iterations: 2,
                style: PrimitiveKind::LineStrip,
                ..Default::default()
            },
        );
    assert_eq!(book, expected);
}

#[test]
fn test_rule_book_load_errors() {
    assert!(matches!(
        RuleBook::load("rules.yaml"),
        Err(LsysError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        RuleBook::load("/nonexistent/rules.json"),
        Err(LsysError::Io { .. })
    ));
    assert!(matches!(
        RuleBook::from_json_str("{\"rules\": 3}"),
        Err(LsysError::Json(_))
    ));

    let path = std::env::temp_dir().join(format!("lsys-mesh-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"rules": {"Q2": {"Q2": ["Q", "F", "Q"]}}}"#).unwrap();
    let book = RuleBook::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(expand(&["Q2"], &book), ["Q", "F", "Q"]);
}
