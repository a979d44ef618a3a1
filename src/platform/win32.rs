use crate::display::DisplayState;
use crate::error::TrackerError;
use crate::input::{InputEvent, InputSink, InputSource, MouseButton};
use crate::overlay::{OverlayGeometry, OverlayStyle, OverlayWindow};
use crate::scheduler::{MessagePump, Retrieved};
use anyhow::anyhow;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{
    BOOL, COLORREF, FALSE, HMODULE, HWND, LPARAM, LRESULT, RECT, TRUE, WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint, FillRect, InvalidateRect,
    SetBkMode, SetTextColor, DT_CENTER, DT_SINGLELINE, DT_VCENTER, PAINTSTRUCT, TRANSPARENT,
};
use windows::Win32::System::Console::SetConsoleCtrlHandler;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetClientRect, GetMessageW, GetSystemMetrics, GetWindowLongPtrW, KillTimer, LoadCursorW,
    PeekMessageW, PostMessageW, PostQuitMessage, PostThreadMessageW, RegisterClassExW,
    SetLayeredWindowAttributes, SetTimer, SetWindowLongPtrW, SetWindowPos, SetWindowsHookExW,
    ShowWindow, TranslateMessage, UnhookWindowsHookEx, UnregisterClassW, CS_HREDRAW, CS_VREDRAW,
    GWLP_USERDATA, HC_ACTION, HHOOK, HMENU, HOOKPROC, HWND_TOPMOST, IDC_ARROW, KBDLLHOOKSTRUCT,
    LWA_ALPHA, MSG, MSLLHOOKSTRUCT, PM_NOREMOVE, SM_CXSCREEN, SWP_NOACTIVATE, SWP_NOMOVE,
    SWP_NOSIZE, SWP_SHOWWINDOW, SW_SHOWNOACTIVATE, WH_KEYBOARD_LL, WH_MOUSE_LL, WINDOWS_HOOK_ID,
    WM_APP, WM_DESTROY, WM_KEYDOWN, WM_LBUTTONDOWN, WM_MBUTTONDOWN, WM_PAINT, WM_QUIT,
    WM_RBUTTONDOWN, WM_SYSKEYDOWN, WM_TIMER, WM_XBUTTONDOWN, WNDCLASSEXW, WS_EX_COMPOSITED,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT,
    WS_POPUP,
};

/// `KBDLLHOOKSTRUCT::flags` bit set for synthesised key events.
pub const LLKHF_INJECTED: u32 = 0x10;
/// `MSLLHOOKSTRUCT::flags` bits set for synthesised mouse events.
pub const LLMHF_INJECTED: u32 = 0x01;
pub const LLMHF_LOWER_IL_INJECTED: u32 = 0x02;

const XBUTTON2: u32 = 0x0002;

/// Posted to the overlay window when a new value is pending.
pub const WM_APM_REPAINT: u32 = WM_APP + 1;

const CLASS_NAME: PCWSTR = w!("ApmOverlayWindow");

pub fn classify_keyboard(message: u32, vk_code: u32) -> Option<InputEvent> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(InputEvent::KeyDown(vk_code)),
        _ => None,
    }
}

/// `mouse_data` is `MSLLHOOKSTRUCT::mouseData`; its high word names the X
/// button.
pub fn classify_mouse(message: u32, mouse_data: u32) -> Option<InputEvent> {
    let button = match message {
        WM_LBUTTONDOWN => MouseButton::Left,
        WM_RBUTTONDOWN => MouseButton::Right,
        WM_MBUTTONDOWN => MouseButton::Middle,
        WM_XBUTTONDOWN => match (mouse_data >> 16) & 0xffff {
            XBUTTON2 => MouseButton::X2,
            _ => MouseButton::X1,
        },
        _ => return None,
    };
    Some(InputEvent::MouseDown(button))
}

pub fn is_injected_key(flags: u32) -> bool {
    flags & LLKHF_INJECTED != 0
}

pub fn is_injected_mouse(flags: u32) -> bool {
    flags & (LLMHF_INJECTED | LLMHF_LOWER_IL_INJECTED) != 0
}

/// Where the hook procedures find the active sink. Written only on
/// subscribe and unsubscribe.
struct HookDispatch {
    ignore_injected: AtomicBool,
    sink: RwLock<Option<Arc<dyn InputSink>>>,
}

impl HookDispatch {
    fn deliver(&self, event: InputEvent, injected: bool) {
        if injected && self.ignore_injected.load(Ordering::Acquire) {
            return;
        }
        if let Ok(guard) = self.sink.read() {
            if let Some(sink) = guard.as_ref() {
                sink.record(event);
            }
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.sink.write() {
            *guard = None;
        }
    }
}

static HOOK_DISPATCH: OnceCell<HookDispatch> = OnceCell::new();

fn hook_dispatch() -> &'static HookDispatch {
    HOOK_DISPATCH.get_or_init(|| HookDispatch {
        ignore_injected: AtomicBool::new(false),
        sink: RwLock::new(None),
    })
}

unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        let info = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        if let Some(event) = classify_keyboard(w_param.0 as u32, info.vkCode) {
            hook_dispatch().deliver(event, is_injected_key(info.flags.0));
        }
    }
    CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param)
}

unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        let info = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        if let Some(event) = classify_mouse(w_param.0 as u32, info.mouseData) {
            hook_dispatch().deliver(event, is_injected_mouse(info.flags));
        }
    }
    CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param)
}

fn install_hook(id: WINDOWS_HOOK_ID, proc_: HOOKPROC, hmodule: HMODULE) -> anyhow::Result<HHOOK> {
    match unsafe { SetWindowsHookExW(id, proc_, hmodule, 0) } {
        Ok(h) if !h.0.is_null() => Ok(h),
        Ok(_) => Err(anyhow!(windows::core::Error::from_win32())),
        Err(e) => Err(anyhow!(e)),
    }
}

fn hook_thread_main(ready_tx: mpsc::SyncSender<anyhow::Result<u32>>) {
    // Ensure the thread has a message queue.
    let mut msg = MSG::default();
    unsafe {
        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
    }
    let thread_id = unsafe { GetCurrentThreadId() };

    let hmodule = match unsafe { GetModuleHandleW(None) } {
        Ok(h) => h,
        Err(e) => {
            let _ = ready_tx.send(Err(anyhow!(e)));
            return;
        }
    };

    let mouse_hook = match install_hook(WH_MOUSE_LL, Some(mouse_hook_proc), hmodule) {
        Ok(h) => h,
        Err(e) => {
            let _ = ready_tx.send(Err(e.context("mouse hook")));
            return;
        }
    };
    let keyboard_hook = match install_hook(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule) {
        Ok(h) => h,
        Err(e) => {
            let _ = ready_tx.send(Err(e.context("keyboard hook")));
            unsafe {
                let _ = UnhookWindowsHookEx(mouse_hook);
            }
            return;
        }
    };

    let _ = ready_tx.send(Ok(thread_id));

    // Low-level hooks are called through this thread's message loop.
    loop {
        let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if r.0 == 0 || r.0 == -1 {
            break;
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    unsafe {
        if let Err(err) = UnhookWindowsHookEx(mouse_hook) {
            tracing::warn!(?err, "failed to remove mouse hook");
        }
        if let Err(err) = UnhookWindowsHookEx(keyboard_hook) {
            tracing::warn!(?err, "failed to remove keyboard hook");
        }
    }
}

/// Wait in the background for a hook thread that missed its readiness
/// deadline. If it reports in late, `stop` is called with its thread id so
/// the hooks it installed are removed, then the thread is joined.
fn stop_when_ready<F>(
    ready_rx: mpsc::Receiver<anyhow::Result<u32>>,
    join: JoinHandle<()>,
    stop: F,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce(u32) + Send + 'static,
{
    std::thread::Builder::new()
        .name("apm-hooks-stop".into())
        .spawn(move || {
            if let Ok(Ok(thread_id)) = ready_rx.recv() {
                tracing::warn!(thread_id, "late hook thread reported ready; stopping it");
                stop(thread_id);
            }
            if join.join().is_err() {
                tracing::warn!("late hook thread panicked");
            }
        })
}

struct HookThread {
    thread_id: u32,
    join: JoinHandle<()>,
}

/// Global `WH_KEYBOARD_LL` + `WH_MOUSE_LL` hooks owned by a dedicated thread.
///
/// Only one instance can be subscribed at a time since the hook procedures
/// share a single dispatch slot.
#[derive(Default)]
pub struct HookInputSource {
    ignore_injected: bool,
    hook_thread: Option<HookThread>,
}

impl HookInputSource {
    pub fn new(ignore_injected: bool) -> Self {
        Self {
            ignore_injected,
            hook_thread: None,
        }
    }
}

impl InputSource for HookInputSource {
    fn subscribe(&mut self, sink: Arc<dyn InputSink>) -> Result<(), TrackerError> {
        if self.hook_thread.is_some() {
            return Err(TrackerError::subscription("already subscribed"));
        }

        let dispatch = hook_dispatch();
        {
            let mut guard = dispatch
                .sink
                .write()
                .map_err(|_| TrackerError::subscription("hook dispatch lock poisoned"))?;
            if guard.is_some() {
                return Err(TrackerError::subscription("another hook source is active"));
            }
            *guard = Some(sink);
        }
        dispatch
            .ignore_injected
            .store(self.ignore_injected, Ordering::Release);

        // Handshake so subscribe() only returns once both hooks are in place.
        let (ready_tx, ready_rx) = mpsc::sync_channel::<anyhow::Result<u32>>(1);
        let join = match std::thread::Builder::new()
            .name("apm-hooks".into())
            .spawn(move || hook_thread_main(ready_tx))
        {
            Ok(join) => join,
            Err(err) => {
                dispatch.clear();
                return Err(TrackerError::subscription(err));
            }
        };

        match ready_rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Ok(thread_id)) => {
                tracing::info!(thread_id, "keyboard and mouse hooks installed");
                self.hook_thread = Some(HookThread { thread_id, join });
                Ok(())
            }
            Ok(Err(err)) => {
                dispatch.clear();
                let _ = join.join();
                Err(TrackerError::subscription(format!("{err:#}")))
            }
            Err(_) => {
                dispatch.clear();
                let stopper = stop_when_ready(ready_rx, join, |thread_id| unsafe {
                    let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
                });
                if let Err(err) = stopper {
                    tracing::error!(?err, "hook thread leaked after readiness timeout");
                }
                Err(TrackerError::subscription(
                    "hook thread did not signal readiness",
                ))
            }
        }
    }

    fn unsubscribe(&mut self) -> anyhow::Result<()> {
        let Some(th) = self.hook_thread.take() else {
            return Ok(());
        };

        // Detach the sink first so no callback reaches it while shutting down.
        hook_dispatch().clear();

        unsafe { PostThreadMessageW(th.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            .map_err(|e| anyhow!(e).context("failed to stop hook thread"))?;
        th.join
            .join()
            .map_err(|_| anyhow!("hook thread panicked"))?;
        tracing::info!("keyboard and mouse hooks removed");
        Ok(())
    }

    fn is_subscribed(&self) -> bool {
        self.hook_thread.is_some()
    }
}

impl Drop for HookInputSource {
    fn drop(&mut self) {
        if let Err(err) = self.unsubscribe() {
            tracing::error!(?err, "failed to unsubscribe input hooks");
        }
    }
}

struct WindowState {
    pending: AtomicU64,
    destroyed: AtomicBool,
    display: Mutex<DisplayState>,
    text_color: COLORREF,
    background: COLORREF,
}

/// Layered, topmost, click-through overlay drawn with GDI.
#[derive(Default)]
pub struct LayeredOverlay {
    hwnd: Option<isize>,
    hinstance: Option<HMODULE>,
    class_registered: bool,
    state: Option<Box<WindowState>>,
}

impl LayeredOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    unsafe fn create_window(
        &mut self,
        geometry: &OverlayGeometry,
        style: &OverlayStyle,
    ) -> Result<(), TrackerError> {
        let hinstance = GetModuleHandleW(None).map_err(TrackerError::window_setup)?;
        self.hinstance = Some(hinstance);

        let cursor = LoadCursorW(None, IDC_ARROW).map_err(TrackerError::window_setup)?;

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wndproc),
            hInstance: hinstance.into(),
            hCursor: cursor,
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        if RegisterClassExW(&wc) == 0 {
            return Err(TrackerError::window_setup(
                windows::core::Error::from_win32(),
            ));
        }
        self.class_registered = true;

        let state = Box::new(WindowState {
            pending: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
            display: Mutex::new(DisplayState::new(style.label.clone())),
            text_color: COLORREF(style.text_color.to_colorref()),
            background: COLORREF(style.background_color.to_colorref()),
        });

        let x = geometry.left_for_screen(GetSystemMetrics(SM_CXSCREEN));
        let hwnd = CreateWindowExW(
            WS_EX_COMPOSITED
                | WS_EX_LAYERED
                | WS_EX_NOACTIVATE
                | WS_EX_TOPMOST
                | WS_EX_TRANSPARENT
                | WS_EX_TOOLWINDOW,
            CLASS_NAME,
            w!("APM"),
            WS_POPUP,
            x,
            geometry.top,
            geometry.width,
            geometry.height,
            None,
            HMENU::default(),
            hinstance,
            None,
        )
        .map_err(TrackerError::window_setup)?;
        if hwnd.0.is_null() {
            return Err(TrackerError::window_setup(
                windows::core::Error::from_win32(),
            ));
        }
        self.hwnd = Some(hwnd.0 as isize);

        SetWindowLongPtrW(hwnd, GWLP_USERDATA, &*state as *const WindowState as isize);
        self.state = Some(state);

        SetLayeredWindowAttributes(hwnd, COLORREF(0), style.opacity, LWA_ALPHA)
            .map_err(TrackerError::window_setup)?;
        let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        SetWindowPos(
            hwnd,
            HWND_TOPMOST,
            0,
            0,
            0,
            0,
            SWP_NOACTIVATE | SWP_NOMOVE | SWP_NOSIZE | SWP_SHOWWINDOW,
        )
        .map_err(TrackerError::window_setup)?;

        tracing::info!(
            x,
            y = geometry.top,
            width = geometry.width,
            height = geometry.height,
            "overlay window created"
        );
        Ok(())
    }
}

impl OverlayWindow for LayeredOverlay {
    fn create(
        &mut self,
        geometry: &OverlayGeometry,
        style: &OverlayStyle,
    ) -> Result<(), TrackerError> {
        if self.is_created() {
            return Ok(());
        }
        let result = unsafe { self.create_window(geometry, style) };
        if result.is_err() {
            // Release whatever was set up before the failing step.
            self.destroy();
        }
        result
    }

    fn request_repaint(&self, value: u64) {
        let (Some(hwnd), Some(state)) = (self.hwnd, self.state.as_ref()) else {
            return;
        };
        state.pending.store(value, Ordering::Release);
        let posted = unsafe {
            PostMessageW(
                HWND(hwnd as *mut _),
                WM_APM_REPAINT,
                WPARAM(0),
                LPARAM(0),
            )
        };
        if let Err(err) = posted {
            tracing::warn!(?err, "failed to post repaint message");
        }
    }

    fn destroy(&mut self) {
        if let Some(hwnd) = self.hwnd.take() {
            let already_destroyed = self
                .state
                .as_ref()
                .map(|s| s.destroyed.load(Ordering::Acquire))
                .unwrap_or(false);
            if !already_destroyed {
                if let Err(err) = unsafe { DestroyWindow(HWND(hwnd as *mut _)) } {
                    tracing::warn!(?err, "failed to destroy overlay window");
                }
            }
        }
        // No message can reach the window procedure any more.
        self.state = None;

        if self.class_registered {
            self.class_registered = false;
            if let Some(hinstance) = self.hinstance {
                if let Err(err) = unsafe { UnregisterClassW(CLASS_NAME, hinstance) } {
                    tracing::debug!(?err, "failed to unregister overlay window class");
                }
            }
        }
        self.hinstance = None;
    }

    fn is_created(&self) -> bool {
        self.hwnd.is_some()
    }
}

impl Drop for LayeredOverlay {
    fn drop(&mut self) {
        self.destroy();
    }
}

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
    if state_ptr != 0 {
        let state = &*(state_ptr as *const WindowState);
        match msg {
            WM_APM_REPAINT => {
                let value = state.pending.load(Ordering::Acquire);
                let changed = state
                    .display
                    .lock()
                    .map(|mut display| display.apply(value))
                    .unwrap_or(false);
                if changed {
                    let _ = InvalidateRect(hwnd, None, false);
                }
                return LRESULT(0);
            }
            WM_PAINT => {
                paint(hwnd, state);
                return LRESULT(0);
            }
            WM_DESTROY => state.destroyed.store(true, Ordering::Release),
            _ => {}
        }
    }
    if msg == WM_DESTROY {
        PostQuitMessage(0);
        return LRESULT(0);
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

unsafe fn paint(hwnd: HWND, state: &WindowState) {
    let mut paint = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut paint);
    let mut rect = RECT::default();
    let _ = GetClientRect(hwnd, &mut rect);

    let brush = CreateSolidBrush(state.background);
    FillRect(hdc, &rect, brush);
    let _ = DeleteObject(brush);

    let mut text: Vec<u16> = state
        .display
        .lock()
        .map(|display| display.text().encode_utf16().collect())
        .unwrap_or_default();
    if !text.is_empty() {
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, state.text_color);
        DrawTextW(
            hdc,
            &mut text,
            &mut rect,
            DT_CENTER | DT_VCENTER | DT_SINGLELINE,
        );
    }
    let _ = EndPaint(hwnd, &paint);
}

static MAIN_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Ctrl+C or closing the console ends the loop through `WM_QUIT` so the
/// normal cleanup path runs.
unsafe extern "system" fn console_ctrl_handler(_ctrl_type: u32) -> BOOL {
    let thread_id = MAIN_THREAD_ID.load(Ordering::Acquire);
    if thread_id == 0 {
        return FALSE;
    }
    match PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) {
        Ok(()) => TRUE,
        Err(_) => FALSE,
    }
}

/// Main-thread queue: `GetMessageW` plus a thread timer for ticks.
pub struct Win32Pump {
    timer_id: usize,
}

impl Win32Pump {
    pub fn new(tick: Duration) -> Result<Self, TrackerError> {
        let elapse = u32::try_from(tick.as_millis()).unwrap_or(u32::MAX);
        let timer_id = unsafe { SetTimer(None, 0, elapse, None) };
        if timer_id == 0 {
            return Err(TrackerError::window_setup(
                windows::core::Error::from_win32(),
            ));
        }

        MAIN_THREAD_ID.store(unsafe { GetCurrentThreadId() }, Ordering::Release);
        if let Err(err) = unsafe { SetConsoleCtrlHandler(Some(console_ctrl_handler), TRUE) } {
            tracing::warn!(?err, "failed to install console control handler");
        }

        tracing::debug!(timer_id, elapse, "tick timer started");
        Ok(Self { timer_id })
    }
}

impl MessagePump for Win32Pump {
    type Message = MSG;

    fn wait(&mut self) -> Retrieved<MSG> {
        let mut msg = MSG::default();
        let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match r.0 {
            -1 => Retrieved::Failed(windows::core::Error::from_win32().to_string()),
            0 => Retrieved::Quit,
            _ if msg.message == WM_TIMER
                && msg.hwnd.0.is_null()
                && msg.wParam.0 == self.timer_id =>
            {
                Retrieved::Tick
            }
            _ => Retrieved::Message(msg),
        }
    }

    fn dispatch(&mut self, msg: MSG) {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

impl Drop for Win32Pump {
    fn drop(&mut self) {
        unsafe {
            let _ = SetConsoleCtrlHandler(Some(console_ctrl_handler), FALSE);
            if let Err(err) = KillTimer(None, self.timer_id) {
                tracing::debug!(?err, "failed to kill tick timer");
            }
        }
        MAIN_THREAD_ID.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_hook_thread_is_stopped() {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<anyhow::Result<u32>>(1);
        let (quit_tx, quit_rx) = mpsc::channel::<u32>();
        let join = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            ready_tx.send(Ok(42)).unwrap();
            // Keeps running until told to stop, like the hook message loop.
            assert_eq!(quit_rx.recv().unwrap(), 42);
        });

        let (stopped_tx, stopped_rx) = mpsc::channel();
        let stopper = stop_when_ready(ready_rx, join, move |thread_id| {
            stopped_tx.send(thread_id).unwrap();
            quit_tx.send(thread_id).unwrap();
        })
        .unwrap();

        stopper.join().unwrap();
        assert_eq!(stopped_rx.recv().unwrap(), 42);
    }

    #[test]
    fn failed_late_hook_thread_is_only_joined() {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<anyhow::Result<u32>>(1);
        let join = std::thread::spawn(move || {
            let _ = ready_tx.send(Err(anyhow!("mouse hook")));
        });
        let stopper = stop_when_ready(ready_rx, join, |_| panic!("nothing to stop")).unwrap();
        stopper.join().unwrap();
    }

    #[test]
    fn injected_flags() {
        assert!(is_injected_key(LLKHF_INJECTED));
        assert!(!is_injected_key(0));
        assert!(is_injected_mouse(LLMHF_INJECTED));
        assert!(is_injected_mouse(LLMHF_LOWER_IL_INJECTED));
        assert!(!is_injected_mouse(0));
    }
}
