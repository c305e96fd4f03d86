use crate::{intersect_objects, HoverEdge, HoverSession, Intersection, Ray};
use glam::Mat4;
use pickscene_common::PickTag;
use pickscene_scene::{ModelHighlight, PickingConfig, Scene};

/// Which candidate group a hover edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickGroup {
    Primary,
    Model,
}

impl std::fmt::Display for PickGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickGroup::Primary => write!(f, "primary"),
            PickGroup::Model => write!(f, "model"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverEvent {
    pub group: PickGroup,
    pub edge: HoverEdge,
}

/// Outcome of one picking frame.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Primary hits, nearest first.
    pub primary_hits: Vec<Intersection>,
    /// Model part hits, nearest first. Empty when no model is installed.
    pub model_hits: Vec<Intersection>,
    /// Hover edges raised this frame, primary before model.
    pub events: Vec<HoverEvent>,
    /// Whether a model was installed and tested.
    pub model_tested: bool,
}

impl FrameReport {
    pub fn nearest_primary(&self) -> Option<&Intersection> {
        self.primary_hits.first()
    }

    pub fn nearest_model(&self) -> Option<&Intersection> {
        self.model_hits.first()
    }
}

/// Per-frame picking state owned by the frame loop.
///
/// Holds one hover session for the primary objects and one for the model.
/// Primary objects always win: the model session only sees a hit in frames
/// where no primary object is under the pointer.
#[derive(Debug, Clone, Default)]
pub struct PickingSession {
    config: PickingConfig,
    primary: HoverSession,
    model: HoverSession,
    frames: u64,
}

impl PickingSession {
    pub fn new(config: PickingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PickingConfig {
        &self.config
    }

    /// Takes effect from the next frame.
    pub fn set_config(&mut self, config: PickingConfig) {
        self.config = config;
    }

    /// Run one picking pass: reset colors, intersect, detect edges and
    /// highlight.
    pub fn frame(&mut self, scene: &mut Scene, ray: &Ray) -> FrameReport {
        let _span = tracing::debug_span!("pick_frame", frame = self.frames).entered();
        self.frames += 1;

        for object in scene.objects_mut() {
            object.reset_color();
        }

        let primary_hits = intersect_objects(ray, scene.objects(), Mat4::IDENTITY);
        let mut events = Vec::new();

        if let Some(edge) = self.primary.update(primary_hits.first().cloned()) {
            log_edge(PickGroup::Primary, &edge);
            events.push(HoverEvent {
                group: PickGroup::Primary,
                edge,
            });
        }

        if let Some(nearest) = primary_hits.first() {
            if let Some(object) = scene
                .objects_mut()
                .iter_mut()
                .find(|o| o.id == nearest.object)
            {
                object.color = self.config.highlight;
            }
        }

        let mut model_hits = Vec::new();
        let model_tested = match scene.model_mut() {
            Some(model) => {
                let parent = model.matrix();
                for part in model.parts_mut() {
                    part.reset_color();
                }
                model_hits = intersect_objects(ray, model.parts(), parent);

                let nearest = if primary_hits.is_empty() {
                    model_hits.first().cloned()
                } else {
                    None
                };
                if let Some(edge) = self.model.update(nearest) {
                    log_edge(PickGroup::Model, &edge);
                    events.push(HoverEvent {
                        group: PickGroup::Model,
                        edge,
                    });
                }

                if let Some(hit) = self.model.current() {
                    let color = self.config.model_highlight_color;
                    match self.config.model_highlight {
                        ModelHighlight::Off => {}
                        ModelHighlight::Part => {
                            if let Some(part) =
                                model.parts_mut().iter_mut().find(|p| p.id == hit.object)
                            {
                                part.color = color;
                            }
                        }
                        ModelHighlight::Whole => {
                            for part in model.parts_mut() {
                                part.color = color;
                            }
                        }
                    }
                }
                true
            }
            None => false,
        };

        tracing::debug!(
            primary = primary_hits.len(),
            model = model_hits.len(),
            model_tested,
            "pick frame"
        );

        FrameReport {
            primary_hits,
            model_hits,
            events,
            model_tested,
        }
    }

    /// Tracked primary hit.
    pub fn current_primary(&self) -> Option<&Intersection> {
        self.primary.current()
    }

    /// Tracked model part hit.
    pub fn current_model(&self) -> Option<&Intersection> {
        self.model.current()
    }

    /// Tag to dispatch a click on. Only primary objects are clickable.
    pub fn clicked_tag(&self) -> Option<&PickTag> {
        self.current_primary().map(|hit| &hit.tag)
    }

    /// Number of frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn log_edge(group: PickGroup, edge: &HoverEdge) {
    let hit = edge.hit();
    match edge {
        HoverEdge::Enter(_) => {
            tracing::info!(%group, tag = %hit.tag, distance = hit.distance, "pointer enter")
        }
        HoverEdge::Leave(_) => tracing::info!(%group, tag = %hit.tag, "pointer leave"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pickscene_common::{Color, Transform};
    use pickscene_scene::{Model, PickableObject, Shape};

    const EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);

    fn ray_to(target: Vec3) -> Ray {
        Ray::new(EYE, target - EYE)
    }

    fn card() -> Model {
        Model::new("card", Transform::default())
            .with_part(
                PickableObject::new(
                    "model/backdrop",
                    Shape::Box {
                        half_extents: Vec3::new(5.0, 5.0, 0.1),
                    },
                )
                .at(Vec3::new(0.0, 0.0, -2.0)),
            )
            .with_part(
                PickableObject::new(
                    "model/corner",
                    Shape::Box {
                        half_extents: Vec3::splat(0.2),
                    },
                )
                .at(Vec3::new(4.0, 4.0, -1.5)),
            )
    }

    #[test]
    fn hovering_highlights_only_the_nearest() {
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();
        let report = session.frame(&mut scene, &ray_to(Vec3::ZERO));

        assert_eq!(report.nearest_primary().unwrap().tag.as_str(), "object-2");
        assert!((report.nearest_primary().unwrap().distance - 2.5).abs() < 1e-4);
        for object in scene.objects() {
            let expected = if object.tag.as_str() == "object-2" {
                Color::BLUE
            } else {
                Color::RED
            };
            assert_eq!(object.color, expected);
        }
        assert_eq!(report.events.len(), 1);
        assert!(report.events[0].edge.is_enter());
        assert_eq!(report.events[0].group, PickGroup::Primary);
        assert_eq!(session.clicked_tag().map(|t| t.as_str()), Some("object-2"));
    }

    #[test]
    fn empty_space_clears_highlight_and_leaves() {
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();
        session.frame(&mut scene, &ray_to(Vec3::ZERO));

        let report = session.frame(&mut scene, &ray_to(Vec3::new(0.0, 5.0, 0.0)));
        assert!(report.primary_hits.is_empty());
        assert!(scene.objects().iter().all(|o| !o.is_highlighted()));
        assert_eq!(report.events.len(), 1);
        assert!(matches!(report.events[0].edge, HoverEdge::Leave(ref hit) if hit.tag.as_str() == "object-2"));
        assert!(session.current_primary().is_none());
        assert_eq!(session.frames(), 2);
    }

    #[test]
    fn model_skipped_until_installed() {
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();
        let report = session.frame(&mut scene, &ray_to(Vec3::new(0.0, -1.5, 0.0)));
        assert!(!report.model_tested);
        assert!(report.model_hits.is_empty());
        assert!(report.events.is_empty());

        scene.install_model(card()).unwrap();
        let report = session.frame(&mut scene, &ray_to(Vec3::new(0.0, -1.5, 0.0)));
        assert!(report.model_tested);
        assert_eq!(report.nearest_model().unwrap().tag.as_str(), "model/backdrop");
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].group, PickGroup::Model);
        assert_eq!(
            session.current_model().map(|h| h.tag.as_str()),
            Some("model/backdrop")
        );
    }

    #[test]
    fn primary_hit_suppresses_model_session() {
        let mut scene = Scene::demo();
        scene.install_model(card()).unwrap();
        let mut session = PickingSession::default();

        session.frame(&mut scene, &ray_to(Vec3::new(0.0, -1.5, 0.0)));
        assert!(session.current_model().is_some());

        // The sphere in front wins; the model reports a leave.
        let report = session.frame(&mut scene, &ray_to(Vec3::ZERO));
        assert!(!report.model_hits.is_empty());
        assert!(session.current_model().is_none());
        let groups: Vec<_> = report.events.iter().map(|e| (e.group, e.edge.is_enter())).collect();
        assert_eq!(groups, vec![(PickGroup::Primary, true), (PickGroup::Model, false)]);
        let model = scene.model().unwrap();
        assert!(model.parts().iter().all(|p| !p.is_highlighted()));
    }

    #[test]
    fn model_highlight_modes() {
        let target = Vec3::new(0.0, -1.5, 0.0);
        let colored = |mode: ModelHighlight| {
            let mut scene = Scene::demo();
            scene.install_model(card()).unwrap();
            let mut session = PickingSession::new(PickingConfig {
                model_highlight: mode,
                ..PickingConfig::default()
            });
            session.frame(&mut scene, &ray_to(target));
            scene
                .model()
                .unwrap()
                .parts()
                .iter()
                .filter(|p| p.is_highlighted())
                .count()
        };
        assert_eq!(colored(ModelHighlight::Off), 0);
        assert_eq!(colored(ModelHighlight::Part), 1);
        assert_eq!(colored(ModelHighlight::Whole), 2);
    }
}
