//! Tribed - bed-leveling lift firmware
//!
//! Main firmware binary for RP2040-based boards driving the three lift
//! points of a self-leveling bed.
//!
//! Execution contexts, highest priority first:
//! - `SWI_IRQ_1` executor: the fixed-rate step tick
//! - `SWI_IRQ_0` executor: limit sensor latching and the abort input
//! - thread mode: the blocking controller task, which also owns the flash

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tribed_core::traits::SpinDelay;
use tribed_core::{Controller, MotionEngine};
use tribed_hal_rp2040::flash::Rp2040FlashStorage;

use crate::board::{Board, BoardPins};
use crate::config::FlashOffsetStore;

mod board;
mod channels;
mod config;
mod controller;
mod tasks;

/// Relax time of the controller's busy-wait loops
const SPIN_US: u32 = 10;

static EXECUTOR_TICK: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_INPUTS: InterruptExecutor = InterruptExecutor::new();

// Shared by the tick, the input tasks and the controller
static ENGINE: StaticCell<MotionEngine> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_TICK.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_INPUTS.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tribed firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration comes first: the engine is built from it
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let config = config::load_machine_config(&mut storage).await;

    let engine: &'static MotionEngine = ENGINE.init(MotionEngine::new(config.motion));

    let pins = BoardPins {
        step: [p.PIN_2.into(), p.PIN_4.into(), p.PIN_6.into()],
        dir: [p.PIN_3.into(), p.PIN_5.into(), p.PIN_7.into()],
        enable: p.PIN_8.into(),
        limits: [p.PIN_10.into(), p.PIN_11.into(), p.PIN_12.into()],
        abort: p.PIN_13.into(),
        ext_endstop: p.PIN_14.into(),
    };
    let board = Board::new(pins, &config.io);
    info!("Board pins configured");

    // P2 preempts the input executor at P3, both preempt thread mode
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let tick_spawner = EXECUTOR_TICK.start(interrupt::SWI_IRQ_1);
    tick_spawner
        .spawn(tasks::step_tick_task(engine, board.steppers))
        .unwrap();

    interrupt::SWI_IRQ_0.set_priority(Priority::P3);
    let input_spawner = EXECUTOR_INPUTS.start(interrupt::SWI_IRQ_0);
    input_spawner
        .spawn(tasks::limits_task(engine, board.limits, board.endstop))
        .unwrap();
    input_spawner
        .spawn(tasks::abort_task(engine, board.abort))
        .unwrap();

    let controller = Controller::new(
        engine,
        config.homing,
        SpinDelay::new(Delay, SPIN_US),
        board.enable,
        FlashOffsetStore::new(storage),
    );

    spawner.spawn(tasks::controller_task(controller)).unwrap();

    info!("All tasks spawned, ready");
}
