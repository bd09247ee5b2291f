//! Lazy model building and the renderer seam.
//!
//! A [`Scene`] owns an immutable [`RuleBook`], an [`Interpreter`], and a [`ModelCache`].
//! Drawing a program runs the interpreter in draw mode; every sub-model it references
//! is expanded, built, and cached on first use, then handed to the [`Renderer`].

use crate::command::tokenize;
use crate::geometry::Mesh;
use crate::interpreter::{DrawContext, Interpreter};
use crate::rewrite::{RewriteConfig, expand_with};
use crate::rules::RuleBook;
use glam::Mat4;
use std::collections::HashMap;

/// Consumer of finished geometry. Owns GPU resources; never sees tokens.
pub trait Renderer {
    /// Uploads `mesh` under `mesh.name`, replacing any previous upload.
    fn build_model(&mut self, mesh: &Mesh);

    /// Draws a previously built model.
    fn draw_model(
        &mut self,
        name: &str,
        model_view_projection: &Mat4,
        model: &Mat4,
        rgba: [f32; 4],
        use_lighting: bool,
        backface_cull: bool,
    );
}

/// Built meshes keyed by model name.
///
/// A name maps to `None` when its expansion produced no vertices, so empty or unknown
/// symbols are not re-expanded every frame. Entries stay until explicitly invalidated.
#[derive(Clone, Debug, Default)]
pub struct ModelCache {
    models: HashMap<String, Option<Mesh>>,
}

impl ModelCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached mesh for `name`, building it from `rules` on first reference.
    ///
    /// The second element is `true` when this call performed the build.
    pub fn get_or_build(
        &mut self,
        name: &str,
        rules: &RuleBook,
        interpreter: &Interpreter,
        rewrite: &RewriteConfig,
    ) -> (Option<&Mesh>, bool) {
        let built = !self.models.contains_key(name);
        if built {
            let mesh = build_mesh(name, rules, interpreter, rewrite);
            self.models.insert(name.to_owned(), mesh);
        }
        let mesh = self.models.get(name).and_then(Option::as_ref);
        (mesh, built)
    }

    /// The cached mesh for `name`. `None` if unbuilt or empty.
    pub fn get(&self, name: &str) -> Option<&Mesh> {
        self.models.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` has been built, including builds that produced nothing.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Discards the cached entry for `name`. Returns whether one existed.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.models.remove(name).is_some()
    }

    /// Discards every entry.
    pub fn clear(&mut self) {
        self.models.clear();
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Expands `name`, interprets it in build mode from the identity, and finishes the mesh.
/// `None` when nothing was emitted.
pub fn build_mesh(
    name: &str,
    rules: &RuleBook,
    interpreter: &Interpreter,
    rewrite: &RewriteConfig,
) -> Option<Mesh> {
    let tokens = expand_with(&[name], rules, rewrite);
    let geometry = interpreter.build(&tokens, Mat4::IDENTITY, &DrawContext::default());
    if geometry.is_empty() {
        log::debug!("model {name:?} produced no geometry");
        return None;
    }

    let meta = rules.meta_or_default(name);
    let mut mesh = Mesh::from_geometry(name, geometry, meta.style);
    mesh.use_lighting = meta.use_lighting;
    mesh.backface_cull = meta.backface_cull;
    log::debug!(
        "built model {name:?}: {} tokens, {} vertices",
        tokens.len(),
        mesh.vertex_count()
    );
    Some(mesh)
}

/// A rule book plus everything needed to draw programs against it.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    rules: RuleBook,
    interpreter: Interpreter,
    rewrite: RewriteConfig,
    cache: ModelCache,
}

impl Scene {
    /// A scene with an empty cache and the default rewrite ceilings.
    pub fn new(rules: RuleBook, interpreter: Interpreter) -> Self {
        Self {
            rules,
            interpreter,
            rewrite: RewriteConfig::default(),
            cache: ModelCache::new(),
        }
    }

    /// Replaces the rewrite ceilings used for model builds.
    pub fn with_rewrite_config(mut self, rewrite: RewriteConfig) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// The active rule book.
    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Builds `name` if it is not cached yet, uploading it to `renderer` when non-empty.
    /// Returns whether a drawable mesh exists for `name`.
    pub fn ensure_model<R: Renderer + ?Sized>(&mut self, name: &str, renderer: &mut R) -> bool {
        let (mesh, built) =
            self.cache
                .get_or_build(name, &self.rules, &self.interpreter, &self.rewrite);
        match mesh {
            Some(mesh) => {
                if built {
                    renderer.build_model(mesh);
                }
                true
            }
            None => false,
        }
    }

    /// Swaps in a new rule book and discards the cached model `name`.
    ///
    /// Other cached models are kept; their rules are assumed unchanged.
    pub fn replace_rules(&mut self, rules: RuleBook, name: &str) {
        self.rules = rules;
        self.cache.invalidate(name);
    }

    /// Drops a cached model so the next reference rebuilds it.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.cache.invalidate(name)
    }

    /// Interprets `program` in draw mode starting from `model`, drawing every referenced
    /// sub-model with `view_projection * transform`.
    pub fn draw<R: Renderer + ?Sized>(
        &mut self,
        program: &str,
        model: Mat4,
        view_projection: Mat4,
        ctx: &DrawContext,
        renderer: &mut R,
    ) {
        let tokens = tokenize(program);
        // Collected up front: building sub-models needs `&mut self`.
        let calls = self.interpreter.draw_list(&tokens, model, ctx);
        for call in &calls {
            if !self.ensure_model(&call.name, renderer) {
                continue;
            }
            let backface_cull = self.rules.meta_or_default(&call.name).backface_cull;
            let mvp = view_projection * call.transform;
            renderer.draw_model(
                &call.name,
                &mvp,
                &call.transform,
                call.attributes.color,
                call.attributes.use_lighting,
                backface_cull,
            );
        }
    }
}
