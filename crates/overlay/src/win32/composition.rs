//! Windows.UI.Composition reticle host

use std::sync::{Arc, Once};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use windows::core::{s, w, Interface, HRESULT, PCWSTR};
use windows::Foundation::Numerics::{Vector2, Vector3};
use windows::System::{DispatcherQueueController, DispatcherQueueHandler};
use windows::Win32::Foundation::{
    BOOL, E_NOTIMPL, E_POINTER, HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM,
};
use windows::Win32::Graphics::Gdi::ScreenToClient;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::System::WinRT::Composition::ICompositorDesktopInterop;
use windows::Win32::System::WinRT::{DispatcherQueueOptions, DQTAT_COM_NONE, DQTYPE_THREAD_CURRENT};
use windows::UI::Composition::{
    Compositor, ContainerVisual, Desktop::DesktopWindowTarget, LayerVisual, SpriteVisual,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, SetWindowPos, ShowWindow, HTTRANSPARENT, HWND_TOPMOST,
    SWP_NOACTIVATE, SW_SHOWNOACTIVATE, WM_NCHITTEST, WS_EX_LAYERED, WS_EX_NOREDIRECTIONBITMAP,
    WS_EX_TOOLWINDOW, WS_EX_TRANSPARENT, WS_POPUP,
};
use zoom::Point;

use super::{monitor_dpi_at, register_class, virtual_screen_rect, OwnedWindow, WINDOW_TITLE};
use crate::layout::{SpriteLayout, SpriteRect};
use crate::platform::{CompositionScene, MonitorLookup, Task};
use crate::settings::{Color, ReticleSettings};
use crate::{OverlayError, OverlayResult};

const HOST_CLASS: PCWSTR = w!("ZoominReticleHost");

static REGISTER: Once = Once::new();

type CreateDispatcherQueueControllerFn = unsafe extern "system" fn(
    DispatcherQueueOptions,
    *mut Option<DispatcherQueueController>,
) -> HRESULT;

/// `CreateDispatcherQueueController`, when CoreMessaging provides it.
static CREATE_DISPATCHER_QUEUE_CONTROLLER: Lazy<Option<CreateDispatcherQueueControllerFn>> =
    Lazy::new(|| unsafe {
        let module = LoadLibraryW(w!("CoreMessaging.dll")).ok()?;
        let proc = GetProcAddress(module, s!("CreateDispatcherQueueController"))?;
        Some(std::mem::transmute::<
            unsafe extern "system" fn() -> isize,
            CreateDispatcherQueueControllerFn,
        >(proc))
    });

struct Visuals {
    controller: DispatcherQueueController,
    // Kept alive for the lifetime of the tree.
    _target: DesktopWindowTarget,
    _root: ContainerVisual,
    left_border: SpriteVisual,
    left: SpriteVisual,
    top_border: SpriteVisual,
    top: SpriteVisual,
    right_border: SpriteVisual,
    right: SpriteVisual,
    bottom_border: SpriteVisual,
    bottom: SpriteVisual,
}

/// Transparent full-screen window the sprites are composed onto.
pub struct CompositionHost {
    // Visuals go before the windows they target.
    visuals: Option<Visuals>,
    host: OwnedWindow,
    _owner: OwnedWindow,
}

impl CompositionHost {
    pub fn open(hinstance: HINSTANCE) -> OverlayResult<Self> {
        if CREATE_DISPATCHER_QUEUE_CONTROLLER.is_none() {
            return Err(OverlayError::Unsupported("CoreMessaging dispatcher queue"));
        }

        register_class(&REGISTER, hinstance, HOST_CLASS, Some(host_wnd_proc))?;

        unsafe {
            // Ownership keeps the host out of the taskbar and alt-tab.
            let owner = OwnedWindow(CreateWindowExW(
                Default::default(),
                w!("static"),
                PCWSTR::null(),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                None,
                hinstance,
                None,
            )?);

            let host = OwnedWindow(CreateWindowExW(
                WS_EX_TRANSPARENT | WS_EX_LAYERED | WS_EX_NOREDIRECTIONBITMAP | WS_EX_TOOLWINDOW,
                HOST_CLASS,
                WINDOW_TITLE,
                WS_POPUP,
                0,
                0,
                0,
                0,
                owner.0,
                None,
                hinstance,
                None,
            )?);

            Ok(Self {
                visuals: None,
                host,
                _owner: owner,
            })
        }
    }

    fn build(&self, settings: &ReticleSettings) -> windows::core::Result<Visuals> {
        let create = CREATE_DISPATCHER_QUEUE_CONTROLLER
            .ok_or_else(|| windows::core::Error::from(E_NOTIMPL))?;

        let options = DispatcherQueueOptions {
            dwSize: std::mem::size_of::<DispatcherQueueOptions>() as u32,
            threadType: DQTYPE_THREAD_CURRENT,
            apartmentType: DQTAT_COM_NONE,
        };
        let mut controller = None;
        unsafe { create(options, &mut controller).ok()? };
        let controller = controller.ok_or_else(|| windows::core::Error::from(E_POINTER))?;

        let compositor = Compositor::new()?;
        let interop: ICompositorDesktopInterop = compositor.cast()?;
        let target = unsafe { interop.CreateDesktopWindowTarget(self.host.0, BOOL(0))? };

        // root -> border layer -> [border sprites, main layer -> main sprites]
        let root = compositor.CreateContainerVisual()?;
        root.SetRelativeSizeAdjustment(Vector2 { X: 1.0, Y: 1.0 })?;
        root.SetOpacity(settings.opacity_fraction())?;
        target.SetRoot(&root)?;

        let border_layer = layer(&compositor)?;
        root.Children()?.InsertAtTop(&border_layer)?;
        let main_layer = layer(&compositor)?;

        let border = |layer: &LayerVisual| sprite(&compositor, layer, settings.border_color);
        let main = |layer: &LayerVisual| sprite(&compositor, layer, settings.main_color);

        let visuals = Visuals {
            left_border: border(&border_layer)?,
            left: main(&main_layer)?,
            top_border: border(&border_layer)?,
            top: main(&main_layer)?,
            right_border: border(&border_layer)?,
            right: main(&main_layer)?,
            bottom_border: border(&border_layer)?,
            bottom: main(&main_layer)?,
            controller,
            _target: target,
            _root: root,
        };

        border_layer.Children()?.InsertAtTop(&main_layer)?;

        Ok(visuals)
    }
}

fn layer(compositor: &Compositor) -> windows::core::Result<LayerVisual> {
    let layer = compositor.CreateLayerVisual()?;
    layer.SetRelativeSizeAdjustment(Vector2 { X: 1.0, Y: 1.0 })?;
    layer.SetOpacity(1.0)?;
    Ok(layer)
}

fn sprite(
    compositor: &Compositor,
    layer: &LayerVisual,
    color: Color,
) -> windows::core::Result<SpriteVisual> {
    let sprite = compositor.CreateSpriteVisual()?;
    sprite.SetAnchorPoint(Vector2 { X: 0.0, Y: 0.0 })?;
    sprite.SetBrush(&compositor.CreateColorBrushWithColor(windows::UI::Color {
        A: 255,
        R: color.r,
        G: color.g,
        B: color.b,
    })?)?;
    layer.Children()?.InsertAtTop(&sprite)?;
    Ok(sprite)
}

fn place(visual: &SpriteVisual, rect: SpriteRect) -> windows::core::Result<()> {
    visual.SetOffset(Vector3 {
        X: rect.x,
        Y: rect.y,
        Z: 0.0,
    })?;
    visual.SetSize(Vector2 {
        X: rect.width,
        Y: rect.height,
    })
}

impl MonitorLookup for CompositionHost {
    fn monitor_dpi(&self, pt: Point) -> Option<u16> {
        monitor_dpi_at(pt)
    }
}

impl CompositionScene for CompositionHost {
    fn init(&mut self, settings: &ReticleSettings) -> OverlayResult<()> {
        if self.visuals.is_some() {
            return Ok(());
        }
        let visuals = self
            .build(settings)
            .map_err(|err| OverlayError::Composition(err.message().to_string()))?;
        self.visuals = Some(visuals);
        Ok(())
    }

    fn show(&mut self) {
        unsafe {
            let _ = ShowWindow(self.host.0, SW_SHOWNOACTIVATE);
        }
    }

    fn cover_virtual_screen(&mut self) {
        // One pixel in from every edge; a transparent window covering the
        // whole screen upsets the taskbar.
        let screen = virtual_screen_rect().inflate(-1, -1);
        unsafe {
            if let Err(err) = SetWindowPos(
                self.host.0,
                HWND_TOPMOST,
                screen.x,
                screen.y,
                screen.width,
                screen.height,
                SWP_NOACTIVATE,
            ) {
                tracing::warn!(%err, "could not stretch reticle host");
            }
        }
    }

    fn screen_to_client(&self, pt: Point) -> Point {
        let mut client = POINT { x: pt.x, y: pt.y };
        unsafe {
            let _ = ScreenToClient(self.host.0, &mut client);
        }
        Point::new(client.x, client.y)
    }

    fn apply(&mut self, layout: &SpriteLayout) {
        let Some(v) = &self.visuals else {
            return;
        };

        let result = [
            (&v.left_border, layout.left_border),
            (&v.left, layout.left),
            (&v.top_border, layout.top_border),
            (&v.top, layout.top),
            (&v.right_border, layout.right_border),
            (&v.right, layout.right),
            (&v.bottom_border, layout.bottom_border),
            (&v.bottom, layout.bottom),
        ]
        .into_iter()
        .try_for_each(|(visual, rect)| place(visual, rect));

        if let Err(err) = result {
            tracing::warn!(%err, "could not move reticle sprites");
        }
    }

    fn enqueue(&self, task: Task) -> Result<(), Task> {
        let Some(v) = &self.visuals else {
            return Err(task);
        };
        let queue = match v.controller.DispatcherQueue() {
            Ok(queue) => queue,
            Err(_) => return Err(task),
        };

        // The handler may be dropped unrun, so the task stays reachable here.
        let slot = Arc::new(Mutex::new(Some(task)));
        let pending = slot.clone();
        let handler = DispatcherQueueHandler::new(move || {
            if let Some(task) = pending.lock().take() {
                task();
            }
            Ok(())
        });

        match queue.TryEnqueue(&handler) {
            Ok(true) => Ok(()),
            _ => match slot.lock().take() {
                Some(task) => Err(task),
                None => Ok(()),
            },
        }
    }
}

unsafe extern "system" fn host_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
