//! WASM API for the 65el02 emulator.
//!
//! Provides JavaScript-callable interfaces for machine control, state
//! inspection and disassembly. The machine always runs unthrottled; the
//! browser's animation loop paces it with `run_for`.

use crate::disassembler::DisassemblyOptions;
use crate::{disassemble, format_instruction, AciaHandle, CpuConfig, Machine};
use wasm_bindgen::prelude::*;

/// RAM mapped at $0000-$7FFF.
const RAM_SIZE: usize = 0x8000;
/// ACIA registers at $A000-$A003.
const ACIA_BASE: u16 = 0xA000;

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

fn js_error(error: impl std::fmt::Display) -> JsError {
    JsError::new(&error.to_string())
}

/// One disassembled instruction
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: u16,
    bytes: Vec<u8>,
    text: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> u16 {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }
}

/// Main emulator interface for JavaScript
#[wasm_bindgen]
pub struct Emulator65el02 {
    machine: Machine,
    acia: AciaHandle,
    on_transmit: js_sys::Function,
}

#[wasm_bindgen]
impl Emulator65el02 {
    /// Creates a machine with 32KB of RAM and an ACIA whose output is passed
    /// to `on_transmit` one character at a time.
    #[wasm_bindgen(constructor)]
    pub fn new(on_transmit: js_sys::Function) -> Result<Emulator65el02, JsError> {
        let mut machine =
            Machine::new(CpuConfig::default().unthrottled(), RAM_SIZE).map_err(js_error)?;
        let acia = machine.attach_acia(ACIA_BASE).map_err(js_error)?;
        Ok(Emulator65el02 {
            machine,
            acia,
            on_transmit,
        })
    }

    /// Resets the CPU and returns it to the bootloader entry point. RAM is kept.
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.machine.reset().map_err(js_error)?;
        self.machine.warm_up();
        Ok(())
    }

    /// Executes a single instruction
    pub fn step(&mut self) -> Result<(), JsError> {
        let result = self.machine.step().map_err(js_error);
        self.flush_transmit();
        result
    }

    /// Runs for roughly `cycles` clock cycles and returns the cycles consumed
    pub fn run_for(&mut self, cycles: u32) -> Result<u32, JsError> {
        let start = self.machine.cpu().cycles();
        let budget = u64::from(cycles);
        let mut result = Ok(());
        while !self.machine.cpu().is_stopped() && self.machine.cpu().cycles() - start < budget {
            if let Err(error) = self.machine.step() {
                self.machine.stop();
                result = Err(js_error(error));
                break;
            }
            if self.machine.cpu().is_waiting() && !self.machine.cpu().state().irq_asserted {
                break;
            }
        }
        self.flush_transmit();
        result.map(|()| (self.machine.cpu().cycles() - start) as u32)
    }

    fn flush_transmit(&self) {
        for byte in self.acia.take_transmitted() {
            let text = char::from(byte).to_string();
            let _ = self
                .on_transmit
                .call1(&JsValue::NULL, &JsValue::from_str(&text));
        }
    }

    /// Delivers a character typed in the terminal to the ACIA
    pub fn receive_char(&mut self, byte: u8) {
        self.acia.receive(byte);
    }

    // Register getters
    #[wasm_bindgen(getter)]
    pub fn a(&self) -> u16 {
        self.machine.cpu().a()
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> u16 {
        self.machine.cpu().x()
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> u16 {
        self.machine.cpu().y()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.machine.cpu().pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u16 {
        self.machine.cpu().sp()
    }

    #[wasm_bindgen(getter)]
    pub fn r(&self) -> u16 {
        self.machine.cpu().r()
    }

    #[wasm_bindgen(getter)]
    pub fn i(&self) -> u16 {
        self.machine.cpu().i()
    }

    #[wasm_bindgen(getter)]
    pub fn d(&self) -> u16 {
        self.machine.cpu().d()
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> u8 {
        self.machine.cpu().status()
    }

    #[wasm_bindgen(getter)]
    pub fn flags(&self) -> String {
        self.machine.cpu().state().flag_string()
    }

    #[wasm_bindgen(getter)]
    pub fn emulation(&self) -> bool {
        self.machine.cpu().state().emulation
    }

    #[wasm_bindgen(getter)]
    pub fn cycles(&self) -> f64 {
        self.machine.cpu().cycles() as f64 // Convert u64 to f64 for JavaScript
    }

    #[wasm_bindgen(getter)]
    pub fn stopped(&self) -> bool {
        self.machine.cpu().is_stopped()
    }

    // Memory access methods

    /// Reads a byte without side effects; unmapped addresses read as 0
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.machine.bus().peek(addr).unwrap_or(0)
    }

    /// Reads a 256-byte page (for efficient display)
    pub fn get_memory_page(&self, page: u8) -> Vec<u8> {
        let start = u16::from(page) << 8;
        (0..=0xFF).map(|i| self.read_memory(start + i)).collect()
    }

    /// Loads an image into RAM and points PC at it
    pub fn load(&mut self, program: &[u8], start_addr: u16) -> Result<(), JsError> {
        self.machine.load_image(start_addr, program).map_err(js_error)?;
        self.machine.cpu_mut().state_mut().pc = start_addr;
        Ok(())
    }

    /// Disassembles `count` instructions starting at `start_addr`
    pub fn disassemble(&self, start_addr: u16, count: u32) -> Vec<JsValue> {
        let window: Vec<u8> = (0..count.saturating_mul(3).min(0x10000))
            .map(|offset| self.read_memory(start_addr.wrapping_add(offset as u16)))
            .collect();
        let options = DisassemblyOptions {
            start_address: start_addr,
            ..DisassemblyOptions::default()
        };

        disassemble(&window, options)
            .iter()
            .take(count as usize)
            .map(|instr| {
                let bytes = (0..u16::from(instr.size_bytes))
                    .map(|offset| self.read_memory(instr.address.wrapping_add(offset)))
                    .collect();
                JsValue::from(DisassemblyLine {
                    address: instr.address,
                    bytes,
                    text: format_instruction(instr),
                })
            })
            .collect()
    }
}
