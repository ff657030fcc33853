//! Stimulator task
//!
//! Owns the cooperative main loop: terminal poll, then every channel's
//! waveform step. Settings are loaded from flash once before the first
//! iteration. Store, load and reboot requests from the terminal are
//! handled between iterations, where awaiting flash is allowed.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_rp::uart::BufferedUart;
use embassy_rp::watchdog::Watchdog;

use galvani_core::scheduler::Scheduler;
use galvani_core::traits::TickCounter;
use galvani_drivers::PulseStage;
use galvani_hal_rp2040::delay::HardwareDelay;
use galvani_hal_rp2040::gpio::Rp2040Output;
use galvani_hal_rp2040::spi::Rp2040Spi;
use galvani_hal_rp2040::uart::Rp2040Uart;
use galvani_protocol::{SystemRequest, Terminal};

use crate::board::CHANNEL_COUNT;
use crate::persistence::SettingsPersistence;
use crate::tasks::tick::TICKS;

/// Pulse stage of this board
pub type BoardStage =
    PulseStage<Rp2040Spi<Spi<'static, SPI0, Blocking>>, Rp2040Output<'static>, CHANNEL_COUNT>;

/// Main-loop context of this board
pub type StimulatorScheduler =
    Scheduler<&'static TickCounter, HardwareDelay, BoardStage, CHANNEL_COUNT>;

/// Operator terminal of this board
pub type StimulatorTerminal = Terminal<Rp2040Uart<BufferedUart>>;

/// Stimulator task - runs the main loop forever
#[embassy_executor::task]
pub async fn stimulator_task(
    stage: BoardStage,
    mut terminal: StimulatorTerminal,
    mut persistence: SettingsPersistence<'static>,
    mut watchdog: Watchdog,
) {
    info!("Stimulator task started");

    let settings = persistence.load_or_default().await;
    let mut scheduler = Scheduler::new(settings, &TICKS, HardwareDelay, stage);
    terminal.banner();

    loop {
        scheduler.iterate(&mut terminal);

        if let Some(request) = terminal.take_request() {
            handle_request(
                request,
                &mut scheduler,
                &mut terminal,
                &mut persistence,
                &mut watchdog,
            )
            .await;
        }

        yield_now().await;
    }
}

async fn handle_request(
    request: SystemRequest,
    scheduler: &mut StimulatorScheduler,
    terminal: &mut StimulatorTerminal,
    persistence: &mut SettingsPersistence<'static>,
    watchdog: &mut Watchdog,
) {
    debug!("System request: {:?}", request);

    match request {
        SystemRequest::Store => match persistence.store(scheduler.settings()).await {
            Ok(()) => terminal.complete_request("Settings stored"),
            Err(e) => {
                warn!("Store failed: {:?}", e);
                terminal.complete_request(e.describe());
            }
        },
        SystemRequest::Load => match persistence.load().await {
            Ok(settings) => {
                *scheduler.settings_mut() = settings;
                terminal.complete_request("Settings loaded");
            }
            Err(e) => {
                warn!("Load failed: {:?}", e);
                terminal.complete_request(e.describe());
            }
        },
        SystemRequest::Reboot => {
            warn!("Reboot requested");
            scheduler.output_mut().release_all();
            watchdog.trigger_reset();
            // the reset lands within a few cycles; nothing may run after it
            loop {
                cortex_m::asm::wfi();
            }
        }
    }
}
