//! Digital input device against the mock controller.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use embedded_hal::digital::InputPin;
use pinsense::config::DEFAULT_DEBOUNCE;
use pinsense::{ConfigError, DigitalInputDevice, Edge, Error, InputConfig, Level, PinMode, Pull};

use crate::mock_hw::{MockError, MockPinController, PinCall};

#[test]
fn construction_configures_pin_as_input() {
    let hw = MockPinController::new();
    let dev = DigitalInputDevice::new(Arc::clone(&hw), InputConfig::new(17)).unwrap();

    assert_eq!(dev.pin(), 17);
    assert_eq!(
        hw.calls(),
        vec![PinCall::Setup { pin: 17, mode: PinMode::Input(Pull::Up) }]
    );
}

#[test]
fn button_preset_is_pull_up_falling_active_low() {
    let hw = MockPinController::new();
    let button = DigitalInputDevice::button(Arc::clone(&hw), 16).unwrap();

    assert_eq!(button.pull(), Pull::Up);
    assert_eq!(button.edge(), Edge::Falling);
    assert_eq!(button.active_state(), Level::Low);
    assert_eq!(button.inactive_state(), Level::High);

    // Released: pulled high.
    assert!(!button.is_active().unwrap());
    hw.set_level(16, Level::Low);
    assert!(button.is_active().unwrap());
}

#[test]
fn is_active_follows_configured_polarity() {
    let hw = MockPinController::new();
    let config = InputConfig {
        pin: Some(5),
        pull: Pull::Down,
        edge: Edge::Rising,
        active_state: Level::High,
    };
    let dev = DigitalInputDevice::new(Arc::clone(&hw), config).unwrap();
    assert_ne!(dev.active_state(), dev.inactive_state());

    hw.set_level(5, Level::High);
    assert!(dev.is_active().unwrap());
    hw.set_level(5, Level::Low);
    assert!(!dev.is_active().unwrap());
}

#[test]
fn missing_pin_is_a_config_error() {
    let hw = MockPinController::new();
    let err = DigitalInputDevice::new(Arc::clone(&hw), InputConfig::default()).unwrap_err();
    assert_eq!(err.as_config(), Some(ConfigError::MissingPin));
    assert!(hw.calls().is_empty(), "nothing may be configured on failure");
}

#[test]
fn unknown_pin_is_a_config_error() {
    let hw = MockPinController::new();
    let err = DigitalInputDevice::new(hw, InputConfig::new(99)).unwrap_err();
    assert_eq!(err.as_config(), Some(ConfigError::InvalidPin(99)));
}

#[test]
fn read_failure_propagates_unchanged() {
    let hw = MockPinController::new();
    let dev = DigitalInputDevice::new(Arc::clone(&hw), InputConfig::new(3)).unwrap();
    hw.fail_reads(3);

    match dev.is_active() {
        Err(Error::Pin(e)) => assert_eq!(e, MockError::ReadFailed(3)),
        other => panic!("expected pin error, got {:?}", other),
    }
}

#[test]
fn wait_for_edge_blocks_until_configured_edge() {
    let hw = MockPinController::new();
    let dev = Arc::new(DigitalInputDevice::button(Arc::clone(&hw), 6).unwrap());

    let waiter = {
        let dev = Arc::clone(&dev);
        std::thread::spawn(move || dev.wait_for_edge())
    };
    hw.wait_for_waiters(6, 1);

    // Already high, so this is not a transition.
    hw.set_level(6, Level::High);
    std::thread::sleep(Duration::from_millis(10));
    assert!(!waiter.is_finished());

    hw.set_level(6, Level::Low);
    assert!(waiter.join().unwrap().is_ok());
}

#[test]
fn wait_for_edge_ignores_opposite_edge() {
    let hw = MockPinController::new();
    hw.set_level(7, Level::Low);
    let dev = Arc::new(DigitalInputDevice::button(Arc::clone(&hw), 7).unwrap());

    let waiter = {
        let dev = Arc::clone(&dev);
        std::thread::spawn(move || dev.wait_for_edge())
    };
    hw.wait_for_waiters(7, 1);

    hw.set_level(7, Level::High);
    std::thread::sleep(Duration::from_millis(30));
    assert!(!waiter.is_finished(), "rising edge must not release a falling-edge wait");

    hw.set_level(7, Level::Low);
    assert!(waiter.join().unwrap().is_ok());
}

#[test]
fn callback_fires_on_edge_and_suppresses_retrigger_within_debounce() {
    let hw = MockPinController::new();
    let dev = DigitalInputDevice::button(Arc::clone(&hw), 12).unwrap();
    let presses = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&presses);
    dev.add_callback(
        move |pin| {
            assert_eq!(pin, 12);
            counter.fetch_add(1, Ordering::SeqCst);
        },
        Duration::from_millis(200),
    )
    .unwrap();

    assert!(hw.calls().contains(&PinCall::AddEventDetect {
        pin: 12,
        edge: Edge::Falling,
        debounce: Duration::from_millis(200),
    }));

    hw.set_level(12, Level::Low);
    assert_eq!(presses.load(Ordering::SeqCst), 1);

    // Bounce inside the interval.
    hw.set_level(12, Level::High);
    hw.set_level(12, Level::Low);
    assert_eq!(presses.load(Ordering::SeqCst), 1, "retrigger within debounce is suppressed");

    std::thread::sleep(Duration::from_millis(250));
    hw.set_level(12, Level::High);
    assert_eq!(presses.load(Ordering::SeqCst), 1, "rising edges do not count");
    hw.set_level(12, Level::Low);
    assert_eq!(presses.load(Ordering::SeqCst), 2);
}

#[test]
fn default_callback_uses_one_second_debounce() {
    let hw = MockPinController::new();
    let dev = DigitalInputDevice::button(Arc::clone(&hw), 13).unwrap();
    dev.add_callback_default(|_pin| {}).unwrap();

    assert_eq!(DEFAULT_DEBOUNCE, Duration::from_millis(1000));
    assert!(hw.calls().contains(&PinCall::AddEventDetect {
        pin: 13,
        edge: Edge::Falling,
        debounce: DEFAULT_DEBOUNCE,
    }));
}

#[test]
fn remove_callback_without_add_is_ok() {
    let hw = MockPinController::new();
    let dev = DigitalInputDevice::button(Arc::clone(&hw), 14).unwrap();
    assert!(dev.remove_callback().is_ok());
    assert!(dev.remove_callback().is_ok());
}

#[test]
fn removed_callback_no_longer_fires() {
    let hw = MockPinController::new();
    let dev = DigitalInputDevice::button(Arc::clone(&hw), 15).unwrap();
    let presses = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&presses);
    dev.add_callback_default(move |_pin| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    hw.set_level(15, Level::Low);
    dev.remove_callback().unwrap();
    assert!(!hw.has_handler(15));
    hw.set_level(15, Level::High);
    hw.set_level(15, Level::Low);

    assert_eq!(presses.load(Ordering::SeqCst), 1);
}

#[test]
fn drop_releases_pin() {
    let hw = MockPinController::new();
    drop(DigitalInputDevice::button(Arc::clone(&hw), 20).unwrap());
    assert_eq!(hw.calls().last(), Some(&PinCall::Release { pin: 20 }));
}

#[test]
fn usable_as_embedded_hal_input() {
    let hw = MockPinController::new();
    let mut dev = DigitalInputDevice::button(Arc::clone(&hw), 21).unwrap();

    assert!(dev.is_high().unwrap());
    hw.set_level(21, Level::Low);
    assert!(dev.is_low().unwrap());
}
