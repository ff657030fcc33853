//! Serial terminal
//!
//! Polled once per main-loop iteration. Each poll takes at most one byte
//! from the UART receive buffer. Output goes into the UART transmit ring
//! without waiting for the line; bytes that do not fit are dropped and
//! counted, so a long listing never holds up pulse generation.
//!
//! Requests that need async hardware access (flash store/load, reboot) are
//! not executed here; they are parked as a [`SystemRequest`] for the
//! firmware to pick up with [`Terminal::take_request`].

use core::fmt::{self, Write as _};

use galvani_core::config::{ChannelSetting, ChannelSettings};
use galvani_core::scheduler::CommandInterpreter;
use galvani_core::waveform::{EngineEvent, WaveformEngine};
use galvani_hal::{UartRx, UartTx};
use heapless::String;

use crate::command::{self, Command, CommandError};
use crate::line::{LineEditor, LineEvent, BELL, BS, MAX_LINE_LENGTH};

/// Input prompt
pub const PROMPT: &str = "TERM> ";

/// Firmware version shown by `VE`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &[&str] = &[
    "HE  HElp",
    "VE  Show VErsion",
    "BO  <code> BOot",
    "HA  Only echo",
    "ST  Show state",
    "GO  <ch|A> Start channel(s)",
    "SP  <ch|A> StoP channel(s)",
    "VO  <ch>,<pos>,<neg> VOltage 0..50",
    "TI  <ch>,<t0>,<t1>,<t2>,<t3>,<t4> TImes x100us",
    "DE  <ch>,<step>,<pulses>,<max> DElta ramp",
    "RC  <ch>,<count> Repeat Count, 0 = endless",
    "QS  <ch> Query Settings",
    "SS  Store Settings",
    "LS  Load Settings",
];

const LINE_CAPACITY: usize = 96;

/// Work the terminal hands to the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemRequest {
    /// Write current settings to flash
    Store,
    /// Replace settings with the flash image
    Load,
    /// Reset the controller
    Reboot,
}

/// Operator terminal on a UART
pub struct Terminal<U> {
    uart: U,
    editor: LineEditor,
    echo_only: bool,
    request: Option<SystemRequest>,
    tx_dropped: u32,
    tx_errors: u32,
    rx_errors: u32,
}

impl<U: UartTx + UartRx> Terminal<U> {
    /// Create a terminal; call [`banner`](Self::banner) once the UART is up
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            editor: LineEditor::new(),
            echo_only: false,
            request: None,
            tx_dropped: 0,
            tx_errors: 0,
            rx_errors: 0,
        }
    }

    /// Greeting, version and first prompt
    pub fn banner(&mut self) {
        self.write(b"\r\n");
        self.say(format_args!("Galvani stimulator terminal"));
        self.say(format_args!("Version {}", VERSION));
        self.prompt();
    }

    /// Take the parked system request, if any
    pub fn take_request(&mut self) -> Option<SystemRequest> {
        self.request.take()
    }

    /// Report the outcome of a store/load and show the prompt again
    pub fn complete_request(&mut self, outcome: &str) {
        self.say(format_args!("{}", outcome));
        self.prompt();
    }

    /// Queue output; whatever the transmit ring cannot take is dropped
    fn write(&mut self, bytes: &[u8]) {
        let queued = match self.uart.try_write(bytes) {
            Ok(n) => n.min(bytes.len()),
            Err(_) => {
                self.tx_errors = self.tx_errors.saturating_add(1);
                0
            }
        };
        let dropped = u32::try_from(bytes.len() - queued).unwrap_or(u32::MAX);
        self.tx_dropped = self.tx_dropped.saturating_add(dropped);
    }

    /// Write one formatted line with CR LF
    fn say(&mut self, args: fmt::Arguments<'_>) {
        let mut line: String<LINE_CAPACITY> = String::new();
        // overlong output is truncated
        let _ = line.write_fmt(args);
        self.write(line.as_bytes());
        self.write(b"\r\n");
    }

    fn prompt(&mut self) {
        self.write(PROMPT.as_bytes());
    }

    fn help(&mut self) {
        self.say(format_args!(
            "HELP: First two characters are the command; implemented:"
        ));
        for text in HELP {
            self.say(format_args!("{}", text));
        }
    }

    fn show_setting(&mut self, channel: usize, s: &ChannelSetting) {
        let t = s.times;
        let d = s.delta;
        self.say(format_args!(
            "CH{} run {} V {}/{} T {}/{}/{}/{}/{} D {}/{}/{} RC {}",
            channel,
            s.run_state.as_raw(),
            s.voltage.positive,
            s.voltage.negative,
            t.pre_wait,
            t.positive,
            t.interphase,
            t.negative,
            t.period,
            d.step,
            d.pulses_per_step,
            d.max_steps,
            s.pulse_limit,
        ));
    }

    fn show_state<const N: usize>(&mut self, engine: &WaveformEngine<N>) {
        for channel in 0..N {
            let Some(rt) = engine.runtime(channel) else {
                continue;
            };
            self.say(format_args!(
                "CH{} state {} pulses {} period {} steps {}",
                channel,
                rt.state.as_u8(),
                rt.pulses_emitted,
                rt.current_period,
                rt.steps_applied,
            ));
        }
        let overruns = self.uart.overrun_count();
        self.say(format_args!("RX overruns {}", overruns));
        let (dropped, tx_errors, rx_errors) = (self.tx_dropped, self.tx_errors, self.rx_errors);
        self.say(format_args!("TX dropped {}", dropped));
        self.say(format_args!("IO errors tx {} rx {}", tx_errors, rx_errors));
    }

    fn execute<const N: usize>(
        &mut self,
        command: Command,
        settings: &mut ChannelSettings<N>,
        engine: &WaveformEngine<N>,
    ) -> Result<(), CommandError> {
        match command {
            Command::Help => self.help(),
            Command::Version => self.say(format_args!("Galvani {}", VERSION)),
            Command::Reboot => {
                self.say(format_args!("Reboot"));
                self.request = Some(SystemRequest::Reboot);
            }
            Command::EchoOnly => self.echo_only = true,
            Command::State => self.show_state(engine),
            Command::Start(select) => {
                settings.start(select)?;
                self.say(format_args!("OK"));
            }
            Command::Stop(select) => {
                settings.stop(select)?;
                self.say(format_args!("OK"));
            }
            Command::SetVoltage { channel, voltage } => {
                settings.set_voltage(channel, voltage)?;
                self.say(format_args!("OK"));
            }
            Command::SetTimes { channel, times } => {
                settings.set_times(channel, times)?;
                self.say(format_args!("OK"));
            }
            Command::SetDelta { channel, delta } => {
                settings.set_delta(channel, delta)?;
                self.say(format_args!("OK"));
            }
            Command::SetRepeatCount { channel, count } => {
                settings.set_repeat_count(channel, count)?;
                self.say(format_args!("OK"));
            }
            Command::Query(channel) => {
                let setting = settings.query(channel)?;
                self.show_setting(channel, &setting);
            }
            Command::Store => self.request = Some(SystemRequest::Store),
            Command::Load => self.request = Some(SystemRequest::Load),
        }
        Ok(())
    }

    fn complete_line<const N: usize>(
        &mut self,
        settings: &mut ChannelSettings<N>,
        engine: &WaveformEngine<N>,
    ) {
        let mut line: String<MAX_LINE_LENGTH> = String::new();
        // same capacity as the editor
        let _ = line.push_str(self.editor.line());
        self.editor.clear();

        if self.echo_only {
            self.say(format_args!("{}", line));
            if line.starts_with('H') {
                self.echo_only = false;
            }
            self.prompt();
            return;
        }

        let result = match command::parse(&line) {
            Ok(Some(cmd)) => self.execute(cmd, settings, engine),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {}
            Err(CommandError::UnknownCommand) => {
                self.say(format_args!("Unknown command"));
                self.help();
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("command rejected: {}", e);
                self.say(format_args!("Parameter error: {}", e.describe()));
            }
        }

        // store/load answer through complete_request
        if !matches!(
            self.request,
            Some(SystemRequest::Store | SystemRequest::Load)
        ) {
            self.prompt();
        }
    }
}

impl<U: UartTx + UartRx, const N: usize> CommandInterpreter<N> for Terminal<U> {
    fn poll(&mut self, settings: &mut ChannelSettings<N>, engine: &WaveformEngine<N>) {
        let byte = match self.uart.try_read_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => return,
            Err(_) => {
                self.rx_errors = self.rx_errors.saturating_add(1);
                return;
            }
        };

        match self.editor.feed(byte) {
            LineEvent::Echo(b) => self.write(&[b]),
            LineEvent::Erase => self.write(&[BS, b' ', BS]),
            LineEvent::Bell => self.write(&[BELL]),
            LineEvent::Ignored => {}
            LineEvent::Complete => {
                self.write(b"\r\n");
                self.complete_line(settings, engine);
            }
        }
    }

    fn report(&mut self, channel: usize, event: EngineEvent) {
        match event {
            EngineEvent::Started => self.say(format_args!("CH{} started", channel)),
            EngineEvent::Running => self.say(format_args!("CH{} running", channel)),
            EngineEvent::PeriodChanged(period) => {
                self.say(format_args!("CH{} period {}", channel, period))
            }
            EngineEvent::Completed { pulses } => {
                self.say(format_args!("CH{} completed {} pulses", channel, pulses))
            }
            EngineEvent::Stopped => self.say(format_args!("CH{} stopped", channel)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galvani_core::config::{RunState, Voltage};
    use std::collections::VecDeque;
    use std::string::String as StdString;
    use std::vec::Vec;

    /// Transmit ring of the firmware's terminal UART
    const TX_RING: usize = 1024;

    struct MockUart {
        rx: VecDeque<u8>,
        /// Bytes queued and not yet sent; tests drain it explicitly
        tx: Vec<u8>,
        tx_capacity: usize,
        tx_fails: bool,
        overruns: u32,
    }

    impl Default for MockUart {
        fn default() -> Self {
            Self {
                rx: VecDeque::new(),
                tx: Vec::new(),
                tx_capacity: TX_RING,
                tx_fails: false,
                overruns: 0,
            }
        }
    }

    impl UartTx for MockUart {
        type Error = ();

        fn try_write(&mut self, data: &[u8]) -> Result<usize, ()> {
            if self.tx_fails {
                return Err(());
            }
            let room = self.tx_capacity.saturating_sub(self.tx.len());
            let n = data.len().min(room);
            self.tx.extend_from_slice(&data[..n]);
            Ok(n)
        }
    }

    impl UartRx for MockUart {
        type Error = ();

        fn try_read_byte(&mut self) -> Result<Option<u8>, ()> {
            Ok(self.rx.pop_front())
        }

        fn overrun_count(&self) -> u32 {
            self.overruns
        }
    }

    struct Rig {
        terminal: Terminal<MockUart>,
        settings: ChannelSettings<2>,
        engine: WaveformEngine<2>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                terminal: Terminal::new(MockUart::default()),
                settings: ChannelSettings::default(),
                engine: WaveformEngine::new(),
            }
        }

        /// Type a line and poll until the input is consumed; returns output
        fn type_line(&mut self, text: &str) -> StdString {
            self.terminal.uart.tx.clear();
            self.terminal.uart.rx.extend(text.bytes());
            self.terminal.uart.rx.push_back(b'\r');
            while !self.terminal.uart.rx.is_empty() {
                self.terminal.poll(&mut self.settings, &self.engine);
            }
            StdString::from_utf8_lossy(&self.terminal.uart.tx).into_owned()
        }
    }

    #[test]
    fn test_banner_ends_with_prompt() {
        let mut rig = Rig::new();
        rig.terminal.banner();
        let out = StdString::from_utf8_lossy(&rig.terminal.uart.tx).into_owned();
        assert!(out.contains("Version"));
        assert!(out.ends_with(PROMPT));
    }

    #[test]
    fn test_echo_and_uppercase_execution() {
        let mut rig = Rig::new();
        let out = rig.type_line("go 1");
        assert!(out.starts_with("go 1\r\n"));
        assert!(out.contains("OK\r\n"));
        assert!(out.ends_with(PROMPT));
        assert_eq!(
            rig.settings.query(1).unwrap().run_state,
            RunState::StartRequested
        );
    }

    #[test]
    fn test_backspace_echo() {
        let mut rig = Rig::new();
        let out = rig.type_line("\x08VX\x08E");
        assert!(out.starts_with("\x07VX\x08 \x08E\r\n"));
        assert!(out.contains("Galvani"));
    }

    #[test]
    fn test_unknown_command_prints_help() {
        let mut rig = Rig::new();
        let out = rig.type_line("ZZ");
        assert!(out.contains("Unknown command\r\n"));
        assert!(out.contains("HE  HElp"));
        assert!(out.contains("LS  Load Settings"));
    }

    #[test]
    fn test_out_of_bounds_leaves_settings() {
        let mut rig = Rig::new();
        let before = rig.settings.clone();
        let out = rig.type_line("VO 0,51,10");
        assert!(out.contains("Parameter error: out of bounds"));
        assert_eq!(rig.settings, before);

        let out = rig.type_line("DE 1,100,10,11");
        assert!(out.contains("Parameter error: out of bounds"));
        assert_eq!(rig.settings, before);
    }

    #[test]
    fn test_missing_and_channel_errors() {
        let mut rig = Rig::new();
        assert!(rig
            .type_line("VO 0,30")
            .contains("Parameter error: missing"));
        assert!(rig
            .type_line("QS 2")
            .contains("Parameter error: no such channel"));
        assert!(rig
            .type_line("BO 1234")
            .contains("Parameter error: access code"));
        assert_eq!(rig.terminal.take_request(), None);
    }

    #[test]
    fn test_set_and_query() {
        let mut rig = Rig::new();
        rig.type_line("VO 1,30,12");
        rig.type_line("TI 1,0,100,10,200,12000");
        rig.type_line("DE 1,0,50000,4");
        rig.type_line("RC 1,25");

        assert_eq!(
            rig.settings.query(1).unwrap().voltage,
            Voltage {
                positive: 30,
                negative: 12
            }
        );
        let out = rig.type_line("QS 1");
        assert!(out.contains("CH1 run 0 V 30/12 T 0/100/10/200/12000 D 0/50000/4 RC 25"));
    }

    #[test]
    fn test_start_all_and_stop() {
        let mut rig = Rig::new();
        rig.type_line("GO A");
        assert!(rig.settings.iter().all(|s| s.run_state.is_active()));
        rig.type_line("SP 0");
        assert_eq!(rig.settings.query(0).unwrap().run_state, RunState::Stopped);
        assert_eq!(
            rig.settings.query(1).unwrap().run_state,
            RunState::StartRequested
        );
    }

    #[test]
    fn test_state_shows_every_channel() {
        let mut rig = Rig::new();
        rig.terminal.uart.overruns = 3;
        let out = rig.type_line("ST");
        assert!(out.contains("CH0 state 0 pulses 0"));
        assert!(out.contains("CH1 state 0 pulses 0"));
        assert!(out.contains("RX overruns 3"));
        assert!(out.contains("TX dropped 0"));
        assert!(out.contains("IO errors tx 0 rx 0"));
    }

    #[test]
    fn test_full_tx_ring_drops_and_counts() {
        let mut rig = Rig::new();
        rig.terminal.uart.tx_capacity = 256;

        // the help listing is longer than the ring
        rig.terminal.uart.tx.clear();
        rig.terminal.uart.rx.extend(b"HE\r".iter());
        let mut total = 0;
        while !rig.terminal.uart.rx.is_empty() {
            rig.terminal.poll(&mut rig.settings, &rig.engine);
            total = rig.terminal.uart.tx.len();
            assert!(total <= 256);
        }
        assert_eq!(total, 256);
        let dropped = rig.terminal.tx_dropped;
        assert!(dropped > 0);

        // listing length = queued + dropped
        rig.terminal.uart.tx_capacity = TX_RING;
        let full = rig.type_line("HE");
        assert_eq!(full.len() as u32, 256 + dropped);

        let out = rig.type_line("ST");
        assert!(out.contains(&std::format!("TX dropped {}", dropped)));
    }

    #[test]
    fn test_longest_replies_fit_the_ring() {
        let mut rig = Rig::new();
        for line in ["HE", "ZZ", "ST", "QS 1"] {
            let out = rig.type_line(line);
            assert!(out.len() < TX_RING, "{} reply is {} bytes", line, out.len());
        }
        assert_eq!(rig.terminal.tx_dropped, 0);
    }

    #[test]
    fn test_tx_error_is_counted() {
        let mut rig = Rig::new();
        rig.terminal.uart.tx_fails = true;
        rig.type_line("VE");
        assert!(rig.terminal.tx_errors > 0);
        assert!(rig.terminal.tx_dropped > 0);

        rig.terminal.uart.tx_fails = false;
        let out = rig.type_line("ST");
        assert!(out.contains(&std::format!("IO errors tx {} rx 0", rig.terminal.tx_errors)));
    }

    #[test]
    fn test_store_defers_prompt() {
        let mut rig = Rig::new();
        let out = rig.type_line("SS");
        assert!(!out.ends_with(PROMPT));
        assert_eq!(rig.terminal.take_request(), Some(SystemRequest::Store));
        assert_eq!(rig.terminal.take_request(), None);

        rig.terminal.uart.tx.clear();
        rig.terminal.complete_request("Settings stored");
        let out = StdString::from_utf8_lossy(&rig.terminal.uart.tx).into_owned();
        assert_eq!(out, "Settings stored\r\nTERM> ");
    }

    #[test]
    fn test_reboot_request() {
        let mut rig = Rig::new();
        let out = rig.type_line("BO C0DE");
        assert!(out.contains("Reboot"));
        assert_eq!(rig.terminal.take_request(), Some(SystemRequest::Reboot));
    }

    #[test]
    fn test_echo_only_mode() {
        let mut rig = Rig::new();
        rig.type_line("HA");
        let out = rig.type_line("GO 0");
        // echoed twice (typing and line echo), not executed
        assert!(out.contains("GO 0\r\nGO 0\r\n"));
        assert_eq!(rig.settings.query(0).unwrap().run_state, RunState::Stopped);

        rig.type_line("HELLO");
        rig.type_line("GO 0");
        assert_eq!(
            rig.settings.query(0).unwrap().run_state,
            RunState::StartRequested
        );
    }

    #[test]
    fn test_engine_reports() {
        let mut rig = Rig::new();
        let terminal = &mut rig.terminal;
        CommandInterpreter::<2>::report(terminal, 1, EngineEvent::PeriodChanged(9900));
        CommandInterpreter::<2>::report(terminal, 0, EngineEvent::Completed { pulses: 25 });
        let out = StdString::from_utf8_lossy(&rig.terminal.uart.tx).into_owned();
        assert_eq!(out, "CH1 period 9900\r\nCH0 completed 25 pulses\r\n");
    }
}
