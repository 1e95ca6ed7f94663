use std::time::Duration;

use slideshow_kiosk::album::AlbumKey;
use slideshow_kiosk::discovery::Slide;
use slideshow_kiosk::events::{ControlEvent, Prefetch, ViewerEvent};
use slideshow_kiosk::playback::PlaybackController;
use slideshow_kiosk::settings::{Settings, SettingsStore};
use slideshow_kiosk::sort::{Direction, SortBy};
use slideshow_kiosk::tasks::player::{self, PlayerContext};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

fn slides(n: usize) -> Vec<Slide> {
    (1..=n)
        .map(|i| Slide {
            file: format!("{i:02}.jpg"),
            src: format!("https://kiosk.example/albums/acme/spring/{i:02}.jpg"),
            title: None,
            date_modified: None,
        })
        .collect()
}

struct Harness {
    control_tx: Sender<ControlEvent>,
    viewer_rx: Receiver<ViewerEvent>,
    _prefetch_rx: Receiver<Prefetch>,
    cancel: CancellationToken,
    tmp: TempDir,
}

fn spawn_player(slide_count: usize, interval: Duration, autoplay: bool) -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let settings = Settings {
        interval_sec: interval.as_secs().max(1),
        ..Settings::default()
    };
    let controller = PlaybackController::new(slides(slide_count), interval);
    let (control_tx, control_rx) = mpsc::channel(16);
    let (viewer_tx, viewer_rx) = mpsc::channel(64);
    let (prefetch_tx, prefetch_rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let ctx = PlayerContext {
        album: AlbumKey::new("acme", "spring").unwrap(),
        store: SettingsStore::new(tmp.path()),
        settings,
        audio: None,
        autoplay,
    };
    tokio::spawn(player::run(
        ctx,
        controller,
        control_rx,
        viewer_tx,
        prefetch_tx,
        cancel.clone(),
    ));
    Harness {
        control_tx,
        viewer_rx,
        _prefetch_rx: prefetch_rx,
        cancel,
        tmp,
    }
}

/// Skip ahead to the next slide render.
async fn next_show(rx: &mut Receiver<ViewerEvent>) -> (usize, usize, String) {
    loop {
        match rx.recv().await.expect("viewer channel closed") {
            ViewerEvent::ShowSlide { slide, index, total } => return (index, total, slide.file),
            _ => continue,
        }
    }
}

/// Skip ahead to the next playing-state announcement.
async fn next_playing(rx: &mut Receiver<ViewerEvent>) -> bool {
    loop {
        match rx.recv().await.expect("viewer channel closed") {
            ViewerEvent::Playing(playing) => return playing,
            _ => continue,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn autoplay_advances_and_wraps_around() {
    let mut h = spawn_player(3, Duration::from_secs(5), true);

    let (index, total, _) = next_show(&mut h.viewer_rx).await;
    assert_eq!((index, total), (0, 3));
    assert!(next_playing(&mut h.viewer_rx).await);

    for expected in [1, 2, 0, 1] {
        let (index, _, _) = next_show(&mut h.viewer_rx).await;
        assert_eq!(index, expected);
    }
    h.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn interval_change_restarts_the_single_timer() {
    let mut h = spawn_player(5, Duration::from_secs(5), true);
    let _ = next_show(&mut h.viewer_rx).await;

    h.control_tx
        .send(ControlEvent::SetInterval(Duration::from_secs(60)))
        .await
        .unwrap();

    // The 5s deadline is replaced outright; nothing fires inside it.
    assert!(
        timeout(Duration::from_secs(30), next_show(&mut h.viewer_rx))
            .await
            .is_err()
    );
    // Exactly one tick arrives at the new period...
    let (index, _, _) = timeout(Duration::from_secs(40), next_show(&mut h.viewer_rx))
        .await
        .expect("tick at the new period");
    assert_eq!(index, 1);
    // ...and no stray second timer follows it.
    assert!(
        timeout(Duration::from_secs(30), next_show(&mut h.viewer_rx))
            .await
            .is_err()
    );
    h.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn manual_navigation_pauses_and_cancels_the_timer() {
    let mut h = spawn_player(3, Duration::from_secs(5), true);
    let _ = next_show(&mut h.viewer_rx).await;
    assert!(next_playing(&mut h.viewer_rx).await);

    h.control_tx.send(ControlEvent::Next).await.unwrap();
    assert!(!next_playing(&mut h.viewer_rx).await);
    let (index, _, _) = next_show(&mut h.viewer_rx).await;
    assert_eq!(index, 1);

    // The timer is gone: no auto-advance even well past the old period.
    assert!(
        timeout(Duration::from_secs(30), next_show(&mut h.viewer_rx))
            .await
            .is_err()
    );
    h.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn goto_wraps_out_of_range_positions() {
    let mut h = spawn_player(3, Duration::from_secs(5), false);
    let _ = next_show(&mut h.viewer_rx).await;

    h.control_tx.send(ControlEvent::Goto(7)).await.unwrap();
    let (index, _, _) = next_show(&mut h.viewer_rx).await;
    assert_eq!(index, 1);

    h.control_tx.send(ControlEvent::Goto(-1)).await.unwrap();
    let (index, _, _) = next_show(&mut h.viewer_rx).await;
    assert_eq!(index, 2);
    h.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn settings_persist_only_on_explicit_save() {
    let mut h = spawn_player(3, Duration::from_secs(5), false);
    let _ = next_show(&mut h.viewer_rx).await;
    let album = AlbumKey::new("acme", "spring").unwrap();

    h.control_tx
        .send(ControlEvent::SetInterval(Duration::from_secs(12)))
        .await
        .unwrap();
    h.control_tx.send(ControlEvent::SetMargin(11)).await.unwrap();
    h.control_tx
        .send(ControlEvent::SetSort(SortBy::Modified, Direction::Desc))
        .await
        .unwrap();
    // The re-render for the sort change confirms the mutations are applied.
    let _ = next_show(&mut h.viewer_rx).await;

    let store = SettingsStore::new(h.tmp.path());
    assert_eq!(
        store.load(&album),
        Settings::default(),
        "nothing persists before the explicit save"
    );

    h.control_tx.send(ControlEvent::SaveSettings).await.unwrap();
    loop {
        if let ViewerEvent::Notice(text) = h.viewer_rx.recv().await.unwrap() {
            assert!(text.contains("saved"));
            break;
        }
    }

    let loaded = store.load(&album);
    assert_eq!(loaded.interval_sec, 12);
    assert_eq!(loaded.margin_pct, 11);
    assert_eq!(loaded.sort_by, SortBy::Modified);
    assert_eq!(loaded.direction, Direction::Desc);
    h.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn margin_nudges_clamp_at_the_edges() {
    let mut h = spawn_player(2, Duration::from_secs(5), false);
    let _ = next_show(&mut h.viewer_rx).await;

    h.control_tx.send(ControlEvent::SetMargin(0)).await.unwrap();
    h.control_tx.send(ControlEvent::AdjustMargin(-1)).await.unwrap();
    h.control_tx.send(ControlEvent::AdjustMargin(1)).await.unwrap();

    let mut margins = Vec::new();
    while margins.len() < 2 {
        if let ViewerEvent::Margin(pct) = h.viewer_rx.recv().await.unwrap() {
            margins.push(pct);
        }
    }
    // The downward nudge at 0 is swallowed; only 0 and 1 are announced.
    assert_eq!(margins, [0, 1]);
    h.cancel.cancel();
}
