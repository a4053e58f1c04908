use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use overlay::{
    create_overlay, CompositionScene, EdgePlacements, EdgeThickness, EdgeWindows, MonitorLookup,
    OverlayError, OverlayPlatform, OverlayResult, ReticleMode, ReticleSettings, SpriteLayout,
    Task, XorSurface,
};
use zoom::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    OpenScene,
    OpenEdges,
    OpenSurface,
    InitScene,
    InitEdges,
    Invert([Rect; 4]),
    Place(EdgePlacements, EdgeThickness),
    ShowEdges,
    ShowScene,
    Layout(SpriteLayout),
    CloseScene,
    CloseEdges,
}

type Log = Rc<RefCell<Vec<Call>>>;

#[derive(Default)]
struct Fake {
    log: Log,
    scene_opens: bool,
    scene_inits: bool,
    edges_open: bool,
    edges_init: bool,
    queue_accepts: bool,
    surface_fails: bool,
}

impl Fake {
    fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    fn inverts(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Invert(_)))
            .count()
    }
}

struct Surface(Log);
struct Edges(Log, bool);
struct Scene(Log, bool, bool);

impl MonitorLookup for Surface {
    fn monitor_dpi(&self, _pt: Point) -> Option<u16> {
        Some(96)
    }
}

impl XorSurface for Surface {
    fn invert(&mut self, strips: &[Rect; 4]) {
        self.0.borrow_mut().push(Call::Invert(*strips));
    }
}

impl MonitorLookup for Edges {
    fn monitor_dpi(&self, _pt: Point) -> Option<u16> {
        Some(96)
    }
}

impl EdgeWindows for Edges {
    fn init(&mut self, _settings: &ReticleSettings) -> OverlayResult<()> {
        self.0.borrow_mut().push(Call::InitEdges);
        if self.1 {
            Ok(())
        } else {
            Err(OverlayError::Unsupported("layered attributes"))
        }
    }

    fn place(&mut self, placements: &EdgePlacements, thickness: EdgeThickness) -> OverlayResult<()> {
        self.0.borrow_mut().push(Call::Place(*placements, thickness));
        Ok(())
    }

    fn show(&mut self) {
        self.0.borrow_mut().push(Call::ShowEdges);
    }
}

impl Drop for Edges {
    fn drop(&mut self) {
        self.0.borrow_mut().push(Call::CloseEdges);
    }
}

impl MonitorLookup for Scene {
    fn monitor_dpi(&self, _pt: Point) -> Option<u16> {
        Some(96)
    }
}

impl CompositionScene for Scene {
    fn init(&mut self, _settings: &ReticleSettings) -> OverlayResult<()> {
        self.0.borrow_mut().push(Call::InitScene);
        if self.1 {
            Ok(())
        } else {
            Err(OverlayError::Composition("no dispatcher".into()))
        }
    }

    fn show(&mut self) {
        self.0.borrow_mut().push(Call::ShowScene);
    }

    fn cover_virtual_screen(&mut self) {}

    fn screen_to_client(&self, pt: Point) -> Point {
        pt
    }

    fn apply(&mut self, layout: &SpriteLayout) {
        self.0.borrow_mut().push(Call::Layout(*layout));
    }

    fn enqueue(&self, task: Task) -> Result<(), Task> {
        if self.2 {
            // A real queue runs it later on its own thread.
            std::thread::spawn(task);
            Ok(())
        } else {
            Err(task)
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.0.borrow_mut().push(Call::CloseScene);
    }
}

impl OverlayPlatform for Fake {
    type Surface = Surface;
    type Edges = Edges;
    type Scene = Scene;

    fn open_scene(&mut self) -> OverlayResult<Scene> {
        self.log.borrow_mut().push(Call::OpenScene);
        if self.scene_opens {
            Ok(Scene(self.log.clone(), self.scene_inits, self.queue_accepts))
        } else {
            Err(OverlayError::Unsupported("composition"))
        }
    }

    fn open_edges(&mut self) -> OverlayResult<Edges> {
        self.log.borrow_mut().push(Call::OpenEdges);
        if self.edges_open {
            Ok(Edges(self.log.clone(), self.edges_init))
        } else {
            Err(OverlayError::Unsupported("layered windows"))
        }
    }

    fn open_surface(&mut self) -> OverlayResult<Surface> {
        self.log.borrow_mut().push(Call::OpenSurface);
        if self.surface_fails {
            return Err(OverlayError::Unsupported("screen DC"));
        }
        Ok(Surface(self.log.clone()))
    }
}

#[test]
fn prefers_composition() {
    let mut fake = Fake {
        scene_opens: true,
        scene_inits: true,
        edges_open: true,
        edges_init: true,
        ..Default::default()
    };
    let overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();

    assert_eq!(overlay.mode(), ReticleMode::Composited);
    assert_eq!(fake.calls(), vec![Call::OpenScene, Call::InitScene]);
}

#[test]
fn failed_init_falls_through_and_releases() {
    let mut fake = Fake {
        scene_opens: true,
        scene_inits: false,
        edges_open: true,
        edges_init: false,
        ..Default::default()
    };
    let overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();

    assert_eq!(overlay.mode(), ReticleMode::Xor);
    assert_eq!(
        fake.calls(),
        vec![
            Call::OpenScene,
            Call::InitScene,
            Call::CloseScene,
            Call::OpenEdges,
            Call::InitEdges,
            Call::CloseEdges,
            Call::OpenSurface,
        ]
    );
}

#[test]
fn no_working_mode_yields_none() {
    let mut fake = Fake {
        scene_opens: true,
        surface_fails: true,
        ..Default::default()
    };
    assert!(create_overlay(&mut fake, 120, 80, ReticleSettings::default()).is_none());
    assert_eq!(
        fake.calls(),
        vec![
            Call::OpenScene,
            Call::InitScene,
            Call::CloseScene,
            Call::OpenEdges,
            Call::OpenSurface,
        ]
    );
}

#[test]
fn four_window_when_composition_is_missing() {
    let mut fake = Fake {
        edges_open: true,
        edges_init: true,
        ..Default::default()
    };
    let mut overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();
    assert_eq!(overlay.mode(), ReticleMode::FourWindow);
    assert!(!overlay.is_visible());

    overlay.update_reticle_position(Point::new(500, 500));
    overlay.update_reticle_position(Point::new(500, 500));
    assert!(overlay.is_visible());

    let calls = fake.calls();
    let places: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Place(p, t) => Some((*p, *t)),
            _ => None,
        })
        .collect();
    assert_eq!(places.len(), 1);

    let (p, t) = places[0];
    let rect = Rect::new(440, 460, 120, 80);
    assert_eq!(t.total(), 4);
    assert_eq!(p.left, Rect::new(436, 460, 4, 80));
    assert_eq!(p.top, Rect::new(436, 456, 128, 4));
    assert_eq!(p.right, Rect::new(560, 460, 4, 80));
    assert_eq!(p.bottom, Rect::new(436, 540, 128, 4));
    assert_eq!(rect.x - p.top.x, t.total());
    assert_eq!(p.top.right() - rect.right(), t.total());

    assert_eq!(calls.last(), Some(&Call::ShowEdges));
}

#[test]
fn xor_draws_are_paired() {
    let mut fake = Fake::default();
    {
        let mut overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();
        assert_eq!(overlay.mode(), ReticleMode::Xor);

        overlay.update_reticle_position(Point::new(10, 10));
        overlay.update_reticle_position(Point::new(10, 10));
        assert_eq!(fake.inverts(), 1);

        overlay.update_reticle_position(Point::new(11, 10));
        overlay.update_reticle_position(Point::new(12, 14));
        assert_eq!(fake.inverts(), 5);
    }
    assert_eq!(fake.inverts(), 6);
}

#[test]
fn init_is_idempotent() {
    let mut fake = Fake {
        edges_open: true,
        edges_init: true,
        ..Default::default()
    };
    let mut overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();
    overlay.init_reticle().unwrap();
    overlay.init_reticle().unwrap();

    let inits = fake
        .calls()
        .into_iter()
        .filter(|c| *c == Call::InitEdges)
        .count();
    assert_eq!(inits, 1);
}

#[test]
fn invoke_runs_inline_when_queue_refuses() {
    let mut fake = Fake {
        scene_opens: true,
        scene_inits: true,
        ..Default::default()
    };
    let overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();
    assert_eq!(overlay.mode(), ReticleMode::Composited);

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    overlay.invoke(move || flag.store(true, Ordering::SeqCst));
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn invoke_posts_to_the_queue() {
    let mut fake = Fake {
        scene_opens: true,
        scene_inits: true,
        queue_accepts: true,
        ..Default::default()
    };
    let overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    overlay.invoke(move || tx.send(std::thread::current().id()).unwrap());
    let worker = rx.recv().unwrap();
    assert_ne!(worker, std::thread::current().id());
}

#[test]
fn composited_update_lays_out_sprites() {
    let mut fake = Fake {
        scene_opens: true,
        scene_inits: true,
        ..Default::default()
    };
    let mut overlay = create_overlay(&mut fake, 120, 80, ReticleSettings::default()).unwrap();
    overlay.update_reticle_position(Point::new(60, 40));

    let calls = fake.calls();
    assert!(calls.contains(&Call::ShowScene));
    let layout = calls
        .iter()
        .find_map(|c| match c {
            Call::Layout(l) => Some(*l),
            _ => None,
        })
        .unwrap();
    // Area spans 0..120 x 0..80; main band starts one border pixel out.
    assert_eq!(layout.left.x, -3.0);
    assert_eq!(layout.right.x, 121.0);
    assert_eq!(layout.bottom.y, 81.0);
}
