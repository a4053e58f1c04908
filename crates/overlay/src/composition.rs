//! Composited reticle

use zoom::{Point, Size};

use crate::layout::sprite_layout;
use crate::platform::{CompositionScene, Task};
use crate::settings::ReticleSettings;
use crate::OverlayResult;

pub struct CompositedReticle<C: CompositionScene> {
    scene: C,
    settings: ReticleSettings,
    size: Size,
    last: Option<Point>,
    visible: bool,
}

impl<C: CompositionScene> CompositedReticle<C> {
    pub fn new(scene: C, size: Size, settings: ReticleSettings) -> Self {
        Self {
            scene,
            settings,
            size,
            last: None,
            visible: false,
        }
    }

    pub fn init(&mut self) -> OverlayResult<()> {
        self.scene.init(&self.settings)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn update(&mut self, pt: Point) {
        if self.last == Some(pt) {
            return;
        }
        self.last = Some(pt);

        if !self.visible {
            self.scene.show();
            self.visible = true;
        }
        self.scene.cover_virtual_screen();

        let Some(dpi) = self.scene.monitor_scaler(pt) else {
            return;
        };

        // The border stays one device pixel wide at any DPI.
        let border = self.settings.border_thickness as f32;
        let main = dpi.scale(self.settings.main_thickness) as f32;

        let client = self.scene.screen_to_client(pt);
        let layout = sprite_layout(client, self.size, border, main);
        tracing::trace!(?client, border, main, "composited reticle");
        self.scene.apply(&layout);
    }

    /// Run `task` on the dispatcher; falls back to running it here.
    pub fn invoke(&self, task: Task) {
        if let Err(task) = self.scene.enqueue(task) {
            tracing::debug!("dispatcher queue refused work, running inline");
            task();
        }
    }
}
