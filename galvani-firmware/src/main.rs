//! Galvani - Stimulation Pulse Generator Firmware
//!
//! Main firmware binary for RP2040-based stimulator boards. Generates
//! biphasic pulse trains on every channel from one cooperative loop, with
//! a 100 µs tick clock kept by a high-priority interrupt executor.
//!
//! Named after Luigi Galvani, whose experiments with electrical
//! stimulation of frog muscle started the field of electrophysiology.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_rp::{bind_interrupts, Peri};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use galvani_core::traits::MicroDelay;
use galvani_drivers::amplitude::Mcp42100;
use galvani_drivers::bridge::HBridge;
use galvani_drivers::bus::Mcp2515;
use galvani_drivers::stage::MAX_DIGIPOTS;
use galvani_drivers::PulseStage;
use galvani_hal_rp2040::delay::HardwareDelay;
use galvani_hal_rp2040::flash::FlashStorage;
use galvani_hal_rp2040::gpio::Rp2040Output;
use galvani_hal_rp2040::spi::Rp2040Spi;
use galvani_hal_rp2040::uart::Rp2040Uart;
use galvani_protocol::Terminal;

use crate::board::{SPI_FREQUENCY, TERMINAL_BAUD, UART_RX_BUFFER, UART_TX_BUFFER};
use crate::persistence::SettingsPersistence;

mod board;
mod defaults;
mod persistence;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; UART_TX_BUFFER]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_RX_BUFFER]> = StaticCell::new();

/// Tick clock executor, preempts the main loop
static EXECUTOR_TICK: InterruptExecutor = InterruptExecutor::new();
/// Main loop executor
static EXECUTOR_MAIN: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_TICK.on_interrupt()
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Galvani firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Tick clock first, everything after may already read it
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let tick_spawner = EXECUTOR_TICK.start(interrupt::SWI_IRQ_1);
    unwrap!(tick_spawner.spawn(tasks::tick_task()));

    // Setup UART for the operator terminal
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = TERMINAL_BAUD;

    let tx_buf = TX_BUF.init([0u8; UART_TX_BUFFER]);
    let rx_buf = RX_BUF.init([0u8; UART_RX_BUFFER]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let terminal = Terminal::new(Rp2040Uart::new(uart));

    info!("UART initialized for terminal");

    // Shared SPI0 for the digipot and the MCP2515
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);

    let digipots: heapless::Vec<_, MAX_DIGIPOTS> =
        [Mcp42100::new(output(p.PIN_17, Level::High))]
            .into_iter()
            .collect();

    let bridges = [
        HBridge::new(
            [output(p.PIN_2, Level::Low), output(p.PIN_3, Level::Low)],
            [output(p.PIN_4, Level::Low), output(p.PIN_5, Level::Low)],
        ),
        HBridge::new(
            [output(p.PIN_6, Level::Low), output(p.PIN_7, Level::Low)],
            [output(p.PIN_8, Level::Low), output(p.PIN_9, Level::Low)],
        ),
    ];

    let mut stage = PulseStage::new(Rp2040Spi::new(spi), digipots, bridges);
    stage.release_all();

    info!("Pulse stage initialized");

    // MCP2515 only provides a clock output
    let mut aux = Mcp2515::new(output(p.PIN_20, Level::High));
    if aux.reset(stage.spi_mut()).is_err() {
        warn!("MCP2515 reset failed");
    }
    HardwareDelay.delay_100us(1);
    if aux.enable_clock_out(stage.spi_mut()).is_err() {
        warn!("MCP2515 clock output setup failed");
    }

    let persistence = SettingsPersistence::new(FlashStorage::new(p.FLASH, p.DMA_CH0));
    let watchdog = Watchdog::new(p.WATCHDOG);

    let executor = EXECUTOR_MAIN.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(spawner.spawn(tasks::stimulator_task(
            stage,
            terminal,
            persistence,
            watchdog,
        )));
        info!("All tasks spawned, firmware running");
    })
}

/// Push-pull output starting at `level`
fn output(pin: Peri<'static, impl Pin>, level: Level) -> Rp2040Output<'static> {
    Rp2040Output::new(Output::new(pin, level))
}
