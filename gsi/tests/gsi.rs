use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use common::{Event, EventKind};
use gsi::{Config, Gsi};
use pretty_assertions::assert_eq;

const LIVE: &[u8] = include_bytes!("../../testfiles/live.json");
const ROUND_OVER: &[u8] = include_bytes!("../../testfiles/round_over.json");
const MENU: &[u8] = include_bytes!("../../testfiles/menu.json");

#[test]
fn publishes_to_subscribers_in_order() {
    let gsi = Gsi::new(Config::default());
    let seen = Arc::new(Mutex::new(Vec::new()));

    for kind in EventKind::ALL {
        let seen = seen.clone();
        gsi.subscribe(kind, move |event| {
            seen.lock().unwrap().push(event.kind());
        });
    }

    gsi.digest(LIVE).unwrap();
    gsi.digest(MENU).unwrap();
    gsi.digest(ROUND_OVER).unwrap();

    assert_eq!(
        vec![
            EventKind::Data,
            EventKind::RoundEnd,
            EventKind::BombExploded,
            EventKind::Mvp,
            EventKind::Data,
        ],
        *seen.lock().unwrap()
    );
}

#[test]
fn round_end_payload() {
    let gsi = Gsi::new(Config::default());
    let winner = Arc::new(Mutex::new(None));

    let slot = winner.clone();
    gsi.subscribe_once(EventKind::RoundEnd, move |event| {
        if let Event::RoundEnd(score) = event {
            *slot.lock().unwrap() = Some((score.winner.name.clone(), score.winner.score));
        }
    });

    gsi.digest(LIVE).unwrap();
    gsi.digest(ROUND_OVER).unwrap();

    assert_eq!(Some(("Bravo".to_owned(), 3)), *winner.lock().unwrap());
    assert_eq!(0, gsi.bus().subscriber_count(EventKind::RoundEnd));
}

#[test]
fn unsubscribed_handlers_are_not_called() {
    let gsi = Gsi::new(Config::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let id = gsi.subscribe(EventKind::Data, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    gsi.digest(LIVE).unwrap();
    assert!(gsi.unsubscribe(id));
    gsi.digest(LIVE).unwrap();

    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[test]
fn concurrent_digests_do_not_interleave() {
    let gsi = Arc::new(Gsi::new(Config::default()));
    let round_ends = Arc::new(AtomicUsize::new(0));
    let data = Arc::new(AtomicUsize::new(0));

    let counter = round_ends.clone();
    gsi.subscribe(EventKind::RoundEnd, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = data.clone();
    gsi.subscribe(EventKind::Data, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    gsi.digest(LIVE).unwrap();

    std::thread::scope(|s| {
        for _ in 0..8 {
            let gsi = gsi.clone();
            s.spawn(move || {
                gsi.digest(ROUND_OVER).unwrap();
            });
        }
    });

    assert_eq!(1, round_ends.load(Ordering::SeqCst));
    assert_eq!(9, data.load(Ordering::SeqCst));
}

#[test]
fn reset_forgets_history() {
    let gsi = Gsi::new(Config::default());
    gsi.digest(LIVE).unwrap();
    gsi.reset();
    assert!(gsi.last().is_none());

    let digest = gsi.digest(ROUND_OVER).unwrap();
    assert_eq!(vec![EventKind::Data], digest.events().iter().map(Event::kind).collect::<Vec<_>>());
}
