use crate::Intersection;

/// Transition of a hover session between "nothing hit" and "something hit".
#[derive(Debug, Clone, PartialEq)]
pub enum HoverEdge {
    /// The pointer started hitting an object.
    Enter(Intersection),
    /// The pointer stopped hitting anything; carries the last hit.
    Leave(Intersection),
}

impl HoverEdge {
    pub fn hit(&self) -> &Intersection {
        match self {
            HoverEdge::Enter(hit) | HoverEdge::Leave(hit) => hit,
        }
    }

    pub fn is_enter(&self) -> bool {
        matches!(self, HoverEdge::Enter(_))
    }
}

/// Two-state hover tracker for one candidate group.
///
/// Moving from one hit object straight to another is not an edge.
#[derive(Debug, Clone, Default)]
pub struct HoverSession {
    current: Option<Intersection>,
}

impl HoverSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this frame's nearest hit and report the edge, if any.
    pub fn update(&mut self, nearest: Option<Intersection>) -> Option<HoverEdge> {
        let edge = match (&self.current, &nearest) {
            (None, Some(hit)) => Some(HoverEdge::Enter(hit.clone())),
            (Some(previous), None) => Some(HoverEdge::Leave(previous.clone())),
            _ => None,
        };
        self.current = nearest;
        edge
    }

    pub fn current(&self) -> Option<&Intersection> {
        self.current.as_ref()
    }

    pub fn is_hovering(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pickscene_common::{ObjectId, PickTag};

    fn hit(tag: &str, distance: f32) -> Intersection {
        Intersection {
            object: ObjectId::new(),
            tag: PickTag::from(tag),
            distance,
            point: Vec3::ZERO,
        }
    }

    #[test]
    fn enter_then_leave() {
        let mut session = HoverSession::new();
        assert_eq!(session.update(None), None);

        let a = hit("a", 1.0);
        assert_eq!(session.update(Some(a.clone())), Some(HoverEdge::Enter(a.clone())));
        assert_eq!(session.current(), Some(&a));

        assert_eq!(session.update(None), Some(HoverEdge::Leave(a)));
        assert!(!session.is_hovering());
    }

    #[test]
    fn steady_state_fires_nothing() {
        let mut session = HoverSession::new();
        let a = hit("a", 1.0);
        session.update(Some(a.clone()));
        for _ in 0..5 {
            assert_eq!(session.update(Some(a.clone())), None);
        }
        session.update(None);
        for _ in 0..5 {
            assert_eq!(session.update(None), None);
        }
    }

    #[test]
    fn switching_objects_updates_current_without_edge() {
        let mut session = HoverSession::new();
        session.update(Some(hit("a", 1.0)));
        let b = hit("b", 2.0);
        assert_eq!(session.update(Some(b.clone())), None);
        assert_eq!(session.current().map(|h| h.tag.as_str()), Some("b"));

        let edge = session.update(None).unwrap();
        assert!(!edge.is_enter());
        assert_eq!(edge.hit(), &b);
    }
}
