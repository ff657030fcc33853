//! Test doubles for pins and the SPI bus

use core::cell::RefCell;
use galvani_hal::{OutputPin, SpiBus};
use std::rc::Rc;
use std::vec::Vec;

/// Bus-level trace shared by every mock on one test rig
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    Pin(&'static str, bool),
    Spi(Vec<u8>),
}

pub type Log = Rc<RefCell<Vec<Trace>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct MockPin {
    name: &'static str,
    high: bool,
    log: Log,
}

impl MockPin {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            high: false,
            log: log.clone(),
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.log.borrow_mut().push(Trace::Pin(self.name, true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.log.borrow_mut().push(Trace::Pin(self.name, false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

pub struct MockSpi {
    log: Log,
    pub fail: bool,
}

impl MockSpi {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MockSpiError;

impl SpiBus for MockSpi {
    type Error = MockSpiError;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockSpiError);
        }
        self.log.borrow_mut().push(Trace::Spi(data.to_vec()));
        Ok(())
    }
}
