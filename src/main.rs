//! Ringnode firmware — ESP32 entry point.
//!
//! Wires the ESP-IDF peripherals (I2S mic, PIR GPIO, quadrature encoder
//! ISRs, RMT NeoPixel, MQTT client) to the platform-agnostic
//! [`NodeService`] and spins the cooperative loop.  Built only with the
//! `espidf` feature for the Xtensa target; all host-side testing goes
//! through the library and mock adapters instead.

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::TickType;
use esp_idf_svc::hal::gpio::{AnyIOPin, InterruptType, PinDriver, Pull};
use esp_idf_svc::hal::i2s::config::{
    Config as I2sConfig, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig,
    StdSlotConfig,
};
use esp_idf_svc::hal::i2s::{I2sDriver, I2sRx};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::mqtt::client::{EspMqttClient, MqttClientConfiguration, QoS};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use ringnode::adapters::time::MonotonicClock;
use ringnode::app::commands::CommandMailbox;
use ringnode::app::ports::{
    AudioSourcePort, BusPort, ClockPort, LedStripPort, MotionSensePort, SwitchSensePort,
};
use ringnode::app::service::NodeService;
use ringnode::config::NodeConfig;
use ringnode::input::encoder::{encoder_isr_handler, seed_encoder_state};
use ringnode::ring::hsv::Rgb;
use ringnode::topics::Topics;
use ringnode::{SensorError, pins};

// Provisioned at build time, same as the original PlatformIO flags.
const WIFI_SSID: &str = match option_env!("RINGNODE_WIFI_SSID") {
    Some(s) => s,
    None => "party",
};
const WIFI_PASS: &str = match option_env!("RINGNODE_WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const BROKER_URL: &str = match option_env!("RINGNODE_BROKER_URL") {
    Some(s) => s,
    None => "mqtt://192.168.50.69:1884",
};

/// Command mailbox shared between the MQTT callback task and the main loop.
static MAILBOX: CommandMailbox = CommandMailbox::new();

// ── Adapters ──────────────────────────────────────────────────

/// I2S microphone: bounded 10 ms wait, fails soft on timeout/short read.
struct I2sMic<'d> {
    driver: I2sDriver<'d, I2sRx>,
    bytes: Vec<u8>,
}

impl AudioSourcePort for I2sMic<'_> {
    fn read_block(&mut self, buf: &mut [i32]) -> Result<usize, SensorError> {
        self.bytes.resize(buf.len() * 4, 0);
        let n = self
            .driver
            .read(&mut self.bytes, TickType::from(Duration::from_millis(10)).ticks())
            .map_err(|_| SensorError::AudioReadFailed)?;
        if n == 0 {
            return Err(SensorError::AudioShortRead);
        }
        let samples = n / 4;
        for (i, chunk) in self.bytes[..samples * 4].chunks_exact(4).enumerate() {
            buf[i] = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(samples)
    }
}

struct PirInput<'d> {
    pin: PinDriver<'d, AnyIOPin, esp_idf_svc::hal::gpio::Input>,
}

impl MotionSensePort for PirInput<'_> {
    fn motion(&mut self) -> bool {
        self.pin.is_high()
    }
}

struct SwitchInput<'d> {
    pin: PinDriver<'d, AnyIOPin, esp_idf_svc::hal::gpio::Input>,
}

impl SwitchSensePort for SwitchInput<'_> {
    fn switch_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// WS2812B output over RMT.  One item per bit, GRB order, 800 kHz timing.
struct NeoPixelStrip<'d> {
    tx: esp_idf_svc::hal::rmt::TxRmtDriver<'d>,
}

impl LedStripPort for NeoPixelStrip<'_> {
    fn show(&mut self, pixels: &[Rgb]) {
        use esp_idf_svc::hal::rmt::{FixedLengthSignal, PinState, Pulse, PulseTicks};

        let ticks_hz = match self.tx.counter_clock() {
            Ok(t) => t,
            Err(e) => {
                warn!("rmt clock query failed: {e}");
                return;
            }
        };
        let ns = |n: u64| {
            PulseTicks::new(((u64::from(ticks_hz.0) * n) / 1_000_000_000) as u16)
                .unwrap_or(PulseTicks::max())
        };
        let (t0h, t0l, t1h, t1l) = (ns(350), ns(800), ns(700), ns(600));

        let mut signal = FixedLengthSignal::<{ 64 * 24 }>::new();
        let mut slot = 0;
        for p in pixels {
            let grb = (u32::from(p.g) << 16) | (u32::from(p.r) << 8) | u32::from(p.b);
            for bit in (0..24).rev() {
                let one = (grb >> bit) & 1 == 1;
                let (high, low) = if one { (t1h, t1l) } else { (t0h, t0l) };
                let _ = signal.set(
                    slot,
                    &(
                        Pulse::new(PinState::High, high),
                        Pulse::new(PinState::Low, low),
                    ),
                );
                slot += 1;
            }
        }
        if let Err(e) = self.tx.start_blocking(&signal) {
            warn!("neopixel tx failed: {e}");
        }
    }
}

/// MQTT-backed Bus: best-effort QoS 0, never retries.
struct MqttBus {
    client: EspMqttClient<'static>,
}

impl BusPort for MqttBus {
    fn publish(&mut self, topic: &str, payload: &str) -> bool {
        self.client
            .enqueue(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .is_ok()
    }
}

// ── Hardware bundle (satisfies all sensor/actuator ports) ─────

struct Hardware<'d> {
    mic: I2sMic<'d>,
    pir: PirInput<'d>,
    switch_pin: SwitchInput<'d>,
    strip: NeoPixelStrip<'d>,
}

impl AudioSourcePort for Hardware<'_> {
    fn read_block(&mut self, buf: &mut [i32]) -> Result<usize, SensorError> {
        self.mic.read_block(buf)
    }
}

impl MotionSensePort for Hardware<'_> {
    fn motion(&mut self) -> bool {
        self.pir.motion()
    }
}

impl SwitchSensePort for Hardware<'_> {
    fn switch_high(&mut self) -> bool {
        self.switch_pin.switch_high()
    }
}

impl LedStripPort for Hardware<'_> {
    fn show(&mut self, pixels: &[Rgb]) {
        self.strip.show(pixels);
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("ringnode v{} booting", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::default();
    let topics = Topics::new(&config.house_id, &config.node_id);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── Encoder pins + ISR ────────────────────────────────────
    let mut enc_a = PinDriver::input(AnyIOPin::from(peripherals.pins.gpio14))?;
    let mut enc_b = PinDriver::input(AnyIOPin::from(peripherals.pins.gpio12))?;
    enc_a.set_pull(Pull::Up)?;
    enc_b.set_pull(Pull::Up)?;
    enc_a.set_interrupt_type(InterruptType::AnyEdge)?;
    enc_b.set_interrupt_type(InterruptType::AnyEdge)?;
    seed_encoder_state(enc_a.is_high(), enc_b.is_high());

    // Both phase ISRs read both pins raw — the handler is lock-free.
    fn decode_edge() {
        let a = unsafe { esp_idf_svc::sys::gpio_get_level(pins::ENCODER_A_GPIO) } != 0;
        let b = unsafe { esp_idf_svc::sys::gpio_get_level(pins::ENCODER_B_GPIO) } != 0;
        encoder_isr_handler(a, b);
    }
    unsafe {
        enc_a.subscribe(decode_edge)?;
        enc_b.subscribe(decode_edge)?;
    }
    enc_a.enable_interrupt()?;
    enc_b.enable_interrupt()?;

    let mut switch_pin = PinDriver::input(AnyIOPin::from(peripherals.pins.gpio15))?;
    switch_pin.set_pull(Pull::Up)?;

    // ── PIR ───────────────────────────────────────────────────
    let pir_pin = PinDriver::input(AnyIOPin::from(peripherals.pins.gpio27))?;

    // ── I2S microphone ────────────────────────────────────────
    let i2s_config = StdConfig::new(
        I2sConfig::default(),
        StdClkConfig::from_sample_rate_hz(config.sample_rate_hz),
        StdSlotConfig::philips_slot_default(DataBitWidth::Bits32, SlotMode::Mono),
        StdGpioConfig::default(),
    );
    let mut i2s = I2sDriver::new_std_rx(
        peripherals.i2s0,
        &i2s_config,
        peripherals.pins.gpio26,
        peripherals.pins.gpio22,
        AnyIOPin::none(),
        peripherals.pins.gpio25,
    )?;
    i2s.rx_enable()?;

    // ── NeoPixel ──────────────────────────────────────────────
    let rmt_config = esp_idf_svc::hal::rmt::config::TransmitConfig::new().clock_divider(1);
    let tx = esp_idf_svc::hal::rmt::TxRmtDriver::new(
        peripherals.rmt.channel0,
        peripherals.pins.gpio5,
        &rmt_config,
    )?;

    // ── WiFi ──────────────────────────────────────────────────
    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID.try_into().unwrap_or_default(),
        password: WIFI_PASS.try_into().unwrap_or_default(),
        ..Default::default()
    }))?;
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("wifi up");

    // ── MQTT ──────────────────────────────────────────────────
    let cmd_topic = topics.ring_cmd();
    let (client, mut connection) = EspMqttClient::new(
        BROKER_URL,
        &MqttClientConfiguration {
            client_id: Some(&format!("rn-{}", config.node_id)),
            ..Default::default()
        },
    )?;

    // Connection task: feed inbound ring commands into the mailbox.
    let _mqtt_task = std::thread::Builder::new()
        .stack_size(6144)
        .spawn(move || {
            use esp_idf_svc::mqtt::client::EventPayload;
            while let Ok(event) = connection.next() {
                if let EventPayload::Received { topic, data, .. } = event.payload() {
                    if topic == Some(cmd_topic.as_str()) {
                        if let Ok(payload) = core::str::from_utf8(data) {
                            MAILBOX.post_json(payload);
                        }
                    }
                }
            }
            warn!("mqtt connection task exited");
        })?;

    let mut bus = MqttBus { client };
    if let Err(e) = bus
        .client
        .subscribe(topics.ring_cmd().as_str(), QoS::AtMostOnce)
    {
        warn!("subscribe failed: {e}");
    }

    // ── Service loop ──────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut service = NodeService::new(&config, clock.now_ms());
    let mut hw = Hardware {
        mic: I2sMic {
            driver: i2s,
            bytes: Vec::new(),
        },
        pir: PirInput { pin: pir_pin },
        switch_pin: SwitchInput { pin: switch_pin },
        strip: NeoPixelStrip { tx },
    };

    info!("entering service loop");
    loop {
        service.service(clock.now_ms(), &mut hw, &mut bus, &MAILBOX);
        // Yield to the IDLE task so the watchdog stays fed.
        std::thread::sleep(Duration::from_millis(2));
    }
}
