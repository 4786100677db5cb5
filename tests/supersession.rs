use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::bounded;
use scanbrot::{
    Canvas, Pixel, RenderConfig, RenderTarget, SessionController, SessionToken, SharedCanvas,
    Step, Viewport, ViewportRequest,
};

const SIZE: usize = 24;

fn controller() -> SessionController {
    let mut config = RenderConfig::default();
    config.update_interval = Duration::from_secs(0);
    SessionController::new(Viewport::default(), config)
}

// Counts rows written by a session after it stopped being current.
struct Watched {
    inner: SharedCanvas,
    token: SessionToken,
    stale_rows: Arc<AtomicUsize>,
}

impl RenderTarget for Watched {
    fn dimensions(&self) -> (usize, usize) {
        self.inner.dimensions()
    }

    fn commit(&mut self, row: usize, scanline: &[u8]) {
        if !self.token.is_current() {
            self.stale_rows.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.commit(row, scanline)
    }
}

fn render_alone(viewport: Viewport, config: RenderConfig) -> Canvas {
    let mut canvas = Canvas::new(SIZE, SIZE);
    SessionController::new(viewport, config)
        .begin(SIZE, SIZE)
        .renderer()
        .run_to_completion(&mut canvas);
    canvas
}

#[test]
fn a_session_begun_on_another_thread_stops_the_old_render() {
    let canvas = SharedCanvas::new(SIZE, SIZE);
    let stale_rows = Arc::new(AtomicUsize::new(0));
    let mut controller = controller();
    let a = controller.begin(SIZE, SIZE);

    let (paused_tx, paused_rx) = bounded(0);
    let (go_tx, go_rx) = bounded(0);

    crossbeam::scope(|s| {
        let mut target = Watched {
            inner: canvas.clone(),
            token: a.token.clone(),
            stale_rows: Arc::clone(&stale_rows),
        };
        let worker = s.spawn(move |_| {
            let mut renderer = a.renderer();
            for _ in 0..3 {
                renderer.resume(&mut target);
            }
            paused_tx.send(()).unwrap();
            go_rx.recv().unwrap();
            renderer.resume(&mut target)
        });

        paused_rx.recv().unwrap();
        controller.request(ViewportRequest::ZoomAtPixel {
            pixel: Pixel(5, 7),
            factor: 0.1,
        });
        let b = controller.begin(SIZE, SIZE);
        go_tx.send(()).unwrap();

        assert_eq!(worker.join().unwrap(), Step::Superseded);

        let mut target = canvas.clone();
        match b.renderer().run_to_completion(&mut target) {
            Step::Completed(p) => assert!(p.is_complete()),
            other => panic!("expected completion, got {:?}", other),
        }
    })
    .unwrap();

    assert_eq!(stale_rows.load(Ordering::SeqCst), 0);
    let expected = render_alone(*controller.viewport(), *controller.config());
    assert_eq!(canvas.snapshot(), expected);
}

#[test]
fn only_the_newest_of_many_sessions_finishes() {
    let mut controller = controller();
    let mut canvas = Canvas::new(SIZE, SIZE);
    let mut stale = Vec::new();

    for i in 0..5 {
        let mut renderer = controller.begin(SIZE, SIZE).renderer();
        renderer.resume(&mut canvas);
        stale.push(renderer);
        controller.request(ViewportRequest::ZoomAtPixel {
            pixel: Pixel(i, SIZE - 1 - i),
            factor: 0.5,
        });
    }
    let mut last = controller.begin(SIZE, SIZE).renderer();

    for renderer in stale.iter_mut() {
        assert_eq!(renderer.resume(&mut canvas), Step::Superseded);
    }
    last.run_to_completion(&mut canvas);

    assert_eq!(
        canvas,
        render_alone(*controller.viewport(), *controller.config())
    );
}

#[test]
fn resizing_the_shared_canvas_supersedes() {
    let canvas = SharedCanvas::new(SIZE, SIZE);
    let mut controller = controller();
    let mut renderer = controller.begin(SIZE, SIZE).renderer();
    let mut target = canvas.clone();
    renderer.resume(&mut target);

    canvas.resize(SIZE * 2, SIZE);
    assert_eq!(renderer.resume(&mut target), Step::Superseded);

    let mut renderer = controller.begin(SIZE * 2, SIZE).renderer();
    match renderer.run_to_completion(&mut target) {
        Step::Completed(p) => assert_eq!(p.pixels, SIZE * SIZE * 2),
        other => panic!("expected completion, got {:?}", other),
    }
}
