// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coordinator adapter: transport lifecycle, reset / recovery and ZDO
//! request framing.
//!
//! # State machine
//!
//! ```text
//!   Disconnected --init()--> Connecting --connected--> AwaitingReset --ready--> Ready
//!        ^          (serial: straight to AwaitingReset)       |
//!        |                                                    |
//!        +------------- reset timeout -> init() <-------------+
//! ```
//!
//! The adapter is sans-IO with respect to time: every entry point takes the
//! current [`Instant`] and [`Adapter::poll`] fires expired timers. Transports
//! signal [`Adapter::waker`] when they have events, so a driver only polls
//! on I/O readiness or at [`Adapter::next_deadline`]. The vendor-specific
//! frame protocol lives behind the [`Coordinator`] trait.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Notify};

use crate::config::{GatewayConfig, ResetStrategy};
use crate::error::{AdapterError, TransportError};
use crate::gpio::{Gpio, PinMode};
use crate::transport::{hex_dump, Transport, TransportEvent, TransportKind};
use crate::zcl;

mod service;
mod timer;
mod zdo;

pub use service::{wait_for_event, AdapterService};
pub use timer::Timer;
pub use zdo::{
    bind_payload, leave_payload, lqi_payload, zdo_payload, BindDestination, IeeeAddress,
    ADDRESS_MODE_64_BIT, ADDRESS_MODE_GROUP, DEFAULT_DST_ENDPOINT, ZDO_BIND_REQUEST,
    ZDO_LEAVE_REQUEST, ZDO_LQI_REQUEST, ZDO_UNBIND_REQUEST,
};

/// Quiet period that closes a receive window.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(20);
/// Time allowed for the coordinator to come up after a reset.
pub const RESET_TIMEOUT: Duration = Duration::from_secs(15);
/// Pulse width of the hardware reset line.
pub const RESET_DELAY: Duration = Duration::from_millis(100);
/// Permit-join broadcast refresh period.
pub const PERMIT_JOIN_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_GROUP: u16 = 0x0000;
pub const IKEA_GROUP: u16 = 0x0385;
pub const GREEN_POWER_GROUP: u16 = 0x0B84;

const EVENT_CAPACITY: usize = 32;

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Disconnected,
    /// TCP connect in flight.
    Connecting,
    /// Reset issued, waiting for the coordinator to report readiness.
    AwaitingReset,
    Ready,
}

/// Observable adapter events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    /// A reset cycle started.
    Reset,
    /// The coordinator stack is up.
    Ready(IeeeAddress),
    PermitJoinUpdated(bool),
}

/// Declared simple descriptor of a local endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub profile_id: u16,
    pub device_id: u16,
    pub in_clusters: Vec<u16>,
    pub out_clusters: Vec<u16>,
}

impl Endpoint {
    fn new(profile_id: u16, device_id: u16) -> Self {
        Self {
            profile_id,
            device_id,
            in_clusters: Vec::new(),
            out_clusters: Vec::new(),
        }
    }
}

fn default_endpoints() -> BTreeMap<u8, Endpoint> {
    let mut ha = Endpoint::new(zcl::PROFILE_HA, 0x0005);
    ha.in_clusters = vec![
        zcl::CLUSTER_BASIC,
        zcl::CLUSTER_ON_OFF,
        zcl::CLUSTER_TIME,
        zcl::CLUSTER_OTA_UPGRADE,
        zcl::CLUSTER_POWER_PROFILE,
        zcl::CLUSTER_COLOR_CONTROL,
    ];
    ha.out_clusters = vec![
        zcl::CLUSTER_BASIC,
        zcl::CLUSTER_GROUPS,
        zcl::CLUSTER_SCENES,
        zcl::CLUSTER_ON_OFF,
        zcl::CLUSTER_LEVEL_CONTROL,
        zcl::CLUSTER_POLL_CONTROL,
        zcl::CLUSTER_COLOR_CONTROL,
        zcl::CLUSTER_ILLUMINANCE_MEASUREMENT,
        zcl::CLUSTER_TEMPERATURE_MEASUREMENT,
        zcl::CLUSTER_PRESSURE_MEASUREMENT,
        zcl::CLUSTER_RELATIVE_HUMIDITY,
        zcl::CLUSTER_OCCUPANCY_SENSING,
        zcl::CLUSTER_SOIL_MOISTURE,
        zcl::CLUSTER_IAS_ZONE,
        zcl::CLUSTER_SMART_ENERGY_METERING,
        zcl::CLUSTER_ELECTRICAL_MEASUREMENT,
        zcl::CLUSTER_TOUCHLINK,
    ];

    let zll = Endpoint::new(zcl::PROFILE_ZLL, 0x0005);

    let mut gp = Endpoint::new(zcl::PROFILE_GP, 0x0061);
    gp.out_clusters = vec![zcl::CLUSTER_GREEN_POWER];

    BTreeMap::from([(0x01, ha), (0x0C, zll), (0xF2, gp)])
}

/// A unicast request handed to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicastRequest<'a> {
    pub transaction_id: u8,
    pub network_address: u16,
    pub src_endpoint: u8,
    pub dst_endpoint: u8,
    pub cluster_id: u16,
    pub payload: &'a [u8],
}

/// Identity reported by the coordinator once its stack is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorInfo {
    pub ieee_address: IeeeAddress,
}

/// Bind / unbind parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRequest {
    /// IEEE address of the device that owns the source endpoint.
    pub device: IeeeAddress,
    pub src_endpoint: u8,
    pub cluster_id: u16,
    /// `None` binds to the coordinator itself.
    pub destination: Option<BindDestination>,
    /// `0` selects endpoint 1.
    pub dst_endpoint: u8,
}

/// The transport as seen by a [`Coordinator`].
pub struct Link {
    transport: Box<dyn Transport>,
    port_debug: bool,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, port_debug: bool) -> Self {
        Self {
            transport,
            port_debug,
        }
    }

    /// Write a frame, dumping it first when port debugging is on.
    pub fn send_data(&mut self, buffer: &[u8]) -> Result<(), TransportError> {
        if self.port_debug {
            tracing::info!("Serial data sent: {}", hex_dump(buffer));
        }
        self.transport.write(buffer)
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }
}

/// Vendor frame protocol spoken by the radio coordinator.
///
/// The adapter drives the lifecycle. Implementations encode the vendor
/// frames and own the request queue.
pub trait Coordinator {
    /// Send the in-band reset command.
    fn soft_reset(&mut self, link: &mut Link) -> Result<(), TransportError>;

    /// Broadcast a permit-join request. `true` when it was accepted.
    fn permit_join(&mut self, link: &mut Link, enabled: bool) -> bool;

    /// Submit a unicast APS request. `true` when it was accepted.
    fn unicast_request(&mut self, link: &mut Link, request: &UnicastRequest<'_>) -> bool;

    /// Consume one receive window. Returns the coordinator identity when
    /// the data completes start-up after a reset.
    fn parse_data(&mut self, link: &mut Link, data: &[u8]) -> Option<CoordinatorInfo>;

    /// Dispatch queued requests. Called on the poll after a receive window.
    fn handle_queue(&mut self, link: &mut Link);
}

/// One adapter per coordinator connection.
pub struct Adapter<C: Coordinator> {
    link: Link,
    coordinator: C,
    gpio: Box<dyn Gpio>,

    pan_id: u16,
    channel: u8,
    write: bool,
    reset_strategy: ResetStrategy,
    boot_pin: String,
    reset_pin: String,
    adapter_debug: bool,

    endpoints: BTreeMap<u8, Endpoint>,
    multicast: Vec<u16>,
    ieee_address: Option<IeeeAddress>,

    state: AdapterState,
    connected: bool,
    serial_error: bool,
    permit_join: bool,
    queue_pending: bool,
    transaction_id: u8,

    receive_timer: Timer,
    reset_timer: Timer,
    release_timer: Timer,
    permit_join_timer: Timer,

    waker: Arc<Notify>,
    events: broadcast::Sender<AdapterEvent>,
}

impl<C: Coordinator> Adapter<C> {
    pub fn new(
        config: &GatewayConfig,
        mut transport: Box<dyn Transport>,
        coordinator: C,
        mut gpio: Box<dyn Gpio>,
    ) -> Self {
        let channel = config.zigbee.effective_channel();
        tracing::info!("Using channel {}", channel);

        if transport.kind() == TransportKind::Serial {
            for pin in [&config.gpio.boot, &config.gpio.reset] {
                if let Err(e) = gpio.direction(pin, PinMode::Output) {
                    tracing::warn!("GPIO {} direction setup failed: {}", pin, e);
                }
            }
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let waker = Arc::new(Notify::new());
        transport.set_waker(Arc::clone(&waker));

        Self {
            link: Link::new(transport, config.debug.port),
            coordinator,
            gpio,
            pan_id: config.zigbee.panid,
            channel,
            write: config.zigbee.write,
            reset_strategy: config.zigbee.reset_strategy(),
            boot_pin: config.gpio.boot.clone(),
            reset_pin: config.gpio.reset.clone(),
            adapter_debug: config.debug.adapter,
            endpoints: default_endpoints(),
            multicast: vec![DEFAULT_GROUP, IKEA_GROUP, GREEN_POWER_GROUP],
            ieee_address: None,
            state: AdapterState::Disconnected,
            connected: false,
            serial_error: false,
            permit_join: false,
            queue_pending: false,
            transaction_id: 0,
            receive_timer: Timer::single_shot(RECEIVE_TIMEOUT),
            reset_timer: Timer::single_shot(RESET_TIMEOUT),
            release_timer: Timer::single_shot(RESET_DELAY),
            permit_join_timer: Timer::periodic(PERMIT_JOIN_TIMEOUT),
            waker,
            events,
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Open the serial port (and reset), or start a TCP connect.
    pub fn init(&mut self, now: Instant) {
        let kind = self.link.kind();

        if kind == TransportKind::Serial && self.link.transport.is_open() {
            self.link.transport.close();
        }
        if kind == TransportKind::Tcp && self.connected {
            self.link.transport.close();
            self.connected = false;
        }
        self.state = AdapterState::Disconnected;

        match self.link.transport.open() {
            Ok(()) if kind == TransportKind::Serial => {
                tracing::info!("Port {} opened successfully", self.link.transport.describe());
                self.serial_error = false;
                self.reset(now);
            }
            Ok(()) => {
                self.state = AdapterState::Connecting;
                if self.adapter_debug {
                    tracing::debug!("Connecting to {}", self.link.transport.describe());
                }
            }
            Err(TransportError::InvalidAddress) => {
                tracing::warn!("Invalid connection address or port number");
            }
            Err(e) => self.transport_error(e, now),
        }
    }

    /// Restart the reset timeout, flush input and run the configured reset.
    pub fn reset(&mut self, now: Instant) {
        self.reset_timer.start(now);
        self.receive_timer.stop();
        let _ = self.link.transport.read_all();

        self.state = AdapterState::AwaitingReset;
        tracing::info!("Resetting adapter ({})", self.reset_strategy.as_str());
        self.emit(AdapterEvent::Reset);

        match self.reset_strategy {
            ResetStrategy::Gpio => {
                self.set_pin(true, false);
                self.release_timer.start(now);
            }
            ResetStrategy::Flow => {
                let result = self
                    .link
                    .transport
                    .set_data_terminal_ready(false)
                    .and_then(|()| self.link.transport.set_request_to_send(true));
                if let Err(e) = result {
                    tracing::warn!("Flow control reset failed: {}", e);
                }
                self.release_timer.start(now);
            }
            ResetStrategy::Soft => {
                if let Err(e) = self.coordinator.soft_reset(&mut self.link) {
                    tracing::warn!("Soft reset failed: {}", e);
                }
            }
        }
    }

    /// Drive boot and reset pins for the GPIO strategy.
    fn set_pin(&mut self, boot: bool, reset: bool) {
        if let Err(e) = self.gpio.set_level(&self.boot_pin, boot) {
            tracing::warn!("GPIO {} write failed: {}", self.boot_pin, e);
        }
        if let Err(e) = self.gpio.set_level(&self.reset_pin, reset) {
            tracing::warn!("GPIO {} write failed: {}", self.reset_pin, e);
        }
    }

    /// End of the reset pulse.
    fn release_reset(&mut self) {
        match self.reset_strategy {
            ResetStrategy::Gpio => {
                if let Err(e) = self.gpio.set_level(&self.reset_pin, true) {
                    tracing::warn!("GPIO {} write failed: {}", self.reset_pin, e);
                }
            }
            ResetStrategy::Flow => {
                if let Err(e) = self.link.transport.set_request_to_send(false) {
                    tracing::warn!("Flow control reset failed: {}", e);
                }
            }
            ResetStrategy::Soft => {}
        }
    }

    /// Process transport events and expired timers.
    pub fn poll(&mut self, now: Instant) {
        if std::mem::take(&mut self.queue_pending) {
            self.coordinator.handle_queue(&mut self.link);
        }

        while let Some(event) = self.link.transport.poll_event() {
            match event {
                TransportEvent::Connected => self.socket_connected(now),
                TransportEvent::DataAvailable => self.receive_timer.start(now),
                TransportEvent::Error(e) => self.transport_error(e, now),
            }
        }

        if self.release_timer.poll(now) {
            self.release_reset();
        }
        if self.receive_timer.poll(now) {
            self.ready_read();
        }
        if self.reset_timer.poll(now) {
            self.reset_timeout(now);
        }
        if self.permit_join_timer.poll(now) {
            self.permit_join_timeout();
        }
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            &self.release_timer,
            &self.receive_timer,
            &self.reset_timer,
            &self.permit_join_timer,
        ]
        .iter()
        .filter_map(|t| t.deadline())
        .min()
    }

    fn socket_connected(&mut self, now: Instant) {
        tracing::info!("Successfully connected to {}", self.link.transport.describe());
        self.connected = true;
        self.reset(now);
    }

    fn transport_error(&mut self, error: TransportError, now: Instant) {
        match self.link.kind() {
            TransportKind::Serial => {
                if !self.serial_error {
                    tracing::warn!("Serial port error: {}", error);
                }
                self.serial_error = true;
            }
            TransportKind::Tcp => {
                tracing::warn!("Connection error: {}", error);
                self.connected = false;
            }
        }
        self.state = AdapterState::Disconnected;
        self.reset_timer.start(now);
    }

    fn ready_read(&mut self) {
        let buffer = self.link.transport.read_all();
        if buffer.is_empty() {
            return;
        }

        if self.link.port_debug {
            tracing::info!("Serial data received: {}", hex_dump(&buffer));
        }

        if let Some(info) = self.coordinator.parse_data(&mut self.link, &buffer) {
            self.coordinator_ready(info);
        }
        self.queue_pending = true;
        // The queue is handled on the next poll, which must not wait for I/O.
        self.waker.notify_one();
    }

    fn coordinator_ready(&mut self, info: CoordinatorInfo) {
        self.reset_timer.stop();
        self.ieee_address = Some(info.ieee_address);
        self.state = AdapterState::Ready;
        if self.adapter_debug {
            tracing::debug!("Coordinator {} ready", info.ieee_address);
        }
        self.emit(AdapterEvent::Ready(info.ieee_address));
    }

    fn reset_timeout(&mut self, now: Instant) {
        if self.link.transport.is_open() || self.connected {
            tracing::warn!("Adapter reset timed out");
        }
        self.init(now);
    }

    // ---------------------------------------------------------------------
    // Permit join
    // ---------------------------------------------------------------------

    /// Open or close the join window. State only changes when the
    /// broadcast was accepted; returns whether it was.
    pub fn set_permit_join(&mut self, enabled: bool, now: Instant) -> bool {
        if !self.coordinator.permit_join(&mut self.link, enabled) {
            return false;
        }

        if self.permit_join != enabled {
            tracing::info!(
                "Permit join {} successfully",
                if enabled { "enabled" } else { "disabled" }
            );

            if enabled {
                self.permit_join_timer.start(now);
            } else {
                self.permit_join_timer.stop();
            }

            self.permit_join = enabled;
            self.emit(AdapterEvent::PermitJoinUpdated(enabled));
        }
        true
    }

    fn permit_join_timeout(&mut self) {
        if self.coordinator.permit_join(&mut self.link, true) {
            return;
        }

        tracing::warn!("Permit join refresh failed, join window closed");
        self.permit_join_timer.stop();
        self.permit_join = false;
        self.emit(AdapterEvent::PermitJoinUpdated(false));
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    /// Rolling 8-bit request id.
    pub fn next_transaction_id(&mut self) -> u8 {
        let id = self.transaction_id;
        self.transaction_id = self.transaction_id.wrapping_add(1);
        id
    }

    pub fn unicast_request(
        &mut self,
        transaction_id: u8,
        network_address: u16,
        src_endpoint: u8,
        dst_endpoint: u8,
        cluster_id: u16,
        payload: &[u8],
    ) -> Result<(), AdapterError> {
        let request = UnicastRequest {
            transaction_id,
            network_address,
            src_endpoint,
            dst_endpoint,
            cluster_id,
            payload,
        };

        if self.coordinator.unicast_request(&mut self.link, &request) {
            Ok(())
        } else {
            Err(AdapterError::RequestRejected { cluster_id })
        }
    }

    pub fn zdo_request(
        &mut self,
        id: u8,
        network_address: u16,
        cluster_id: u16,
        data: &[u8],
    ) -> Result<(), AdapterError> {
        let payload = zdo_payload(id, network_address, data);
        self.unicast_request(id, network_address, 0x00, 0x00, cluster_id, &payload)
    }

    pub fn bind_request(
        &mut self,
        id: u8,
        network_address: u16,
        request: &BindRequest,
    ) -> Result<(), AdapterError> {
        self.binding(id, network_address, request, ZDO_BIND_REQUEST)
    }

    pub fn unbind_request(
        &mut self,
        id: u8,
        network_address: u16,
        request: &BindRequest,
    ) -> Result<(), AdapterError> {
        self.binding(id, network_address, request, ZDO_UNBIND_REQUEST)
    }

    fn binding(
        &mut self,
        id: u8,
        network_address: u16,
        request: &BindRequest,
        cluster_id: u16,
    ) -> Result<(), AdapterError> {
        let destination = request
            .destination
            .unwrap_or_else(|| BindDestination::Extended(self.ieee_address.unwrap_or_default()));

        let payload = bind_payload(
            id,
            request.device,
            request.src_endpoint,
            request.cluster_id,
            destination,
            request.dst_endpoint,
        );
        self.unicast_request(id, network_address, 0x00, 0x00, cluster_id, &payload)
    }

    pub fn leave_request(
        &mut self,
        id: u8,
        network_address: u16,
        device: IeeeAddress,
    ) -> Result<(), AdapterError> {
        let payload = leave_payload(id, device);
        self.unicast_request(id, network_address, 0x00, 0x00, ZDO_LEAVE_REQUEST, &payload)
    }

    pub fn lqi_request(&mut self, id: u8, network_address: u16, index: u8) -> Result<(), AdapterError> {
        let payload = lqi_payload(id, index);
        self.unicast_request(id, network_address, 0x00, 0x00, ZDO_LQI_REQUEST, &payload)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Fires when the adapter has work for [`Adapter::poll`] that is not
    /// tied to a timer deadline.
    pub fn waker(&self) -> Arc<Notify> {
        Arc::clone(&self.waker)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AdapterEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn permit_join(&self) -> bool {
        self.permit_join
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn ieee_address(&self) -> Option<IeeeAddress> {
        self.ieee_address
    }

    pub fn pan_id(&self) -> u16 {
        self.pan_id
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Whether the coordinator may overwrite its stored network settings.
    pub fn write_enabled(&self) -> bool {
        self.write
    }

    pub fn reset_strategy(&self) -> ResetStrategy {
        self.reset_strategy
    }

    pub fn endpoints(&self) -> &BTreeMap<u8, Endpoint> {
        &self.endpoints
    }

    pub fn multicast_groups(&self) -> &[u16] {
        &self.multicast
    }

    pub fn add_multicast_group(&mut self, group: u16) {
        if !self.multicast.contains(&group) {
            self.multicast.push(group);
        }
    }

    pub fn coordinator(&self) -> &C {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut C {
        &mut self.coordinator
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }

    /// Reset timeout deadline, `None` when no recovery cycle is pending.
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_timer.deadline()
    }

    pub fn permit_join_deadline(&self) -> Option<Instant> {
        self.permit_join_timer.deadline()
    }
}

impl<C: Coordinator> Drop for Adapter<C> {
    fn drop(&mut self) {
        if self.connected {
            self.link.transport.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::NullGpio;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct LoopbackTransport {
        open: bool,
        rx: Vec<u8>,
        events: VecDeque<TransportEvent>,
    }

    impl Transport for LoopbackTransport {
        fn kind(&self) -> TransportKind {
            TransportKind::Serial
        }
        fn describe(&self) -> String {
            "loopback".into()
        }
        fn open(&mut self) -> Result<(), TransportError> {
            self.open = true;
            Ok(())
        }
        fn close(&mut self) {
            self.open = false;
        }
        fn is_open(&self) -> bool {
            self.open
        }
        fn poll_event(&mut self) -> Option<TransportEvent> {
            self.events.pop_front()
        }
        fn read_all(&mut self) -> Vec<u8> {
            std::mem::take(&mut self.rx)
        }
        fn write(&mut self, _data: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        sent: Vec<(u16, Vec<u8>)>,
        accept: bool,
    }

    impl Coordinator for Recorder {
        fn soft_reset(&mut self, _link: &mut Link) -> Result<(), TransportError> {
            Ok(())
        }
        fn permit_join(&mut self, _link: &mut Link, _enabled: bool) -> bool {
            self.accept
        }
        fn unicast_request(&mut self, _link: &mut Link, request: &UnicastRequest<'_>) -> bool {
            self.sent.push((request.cluster_id, request.payload.to_vec()));
            self.accept
        }
        fn parse_data(&mut self, _link: &mut Link, _data: &[u8]) -> Option<CoordinatorInfo> {
            None
        }
        fn handle_queue(&mut self, _link: &mut Link) {}
    }

    fn adapter(accept: bool) -> Adapter<Recorder> {
        Adapter::new(
            &GatewayConfig::default(),
            Box::new(LoopbackTransport::default()),
            Recorder {
                accept,
                ..Default::default()
            },
            Box::new(NullGpio),
        )
    }

    #[test]
    fn test_endpoint_table_and_groups() {
        let mut adapter = adapter(true);
        let endpoints = adapter.endpoints();
        assert_eq!(endpoints.len(), 3);
        assert_eq!(endpoints[&0x01].profile_id, zcl::PROFILE_HA);
        assert_eq!(endpoints[&0x0C].profile_id, zcl::PROFILE_ZLL);
        assert_eq!(endpoints[&0xF2].out_clusters, vec![zcl::CLUSTER_GREEN_POWER]);

        assert_eq!(adapter.multicast_groups(), &[DEFAULT_GROUP, IKEA_GROUP, GREEN_POWER_GROUP]);
        adapter.add_multicast_group(0x1234);
        adapter.add_multicast_group(0x1234);
        assert_eq!(adapter.multicast_groups().len(), 4);
    }

    #[test]
    fn test_transaction_id_wraps() {
        let mut adapter = adapter(true);
        for expected in 0..=255u8 {
            assert_eq!(adapter.next_transaction_id(), expected);
        }
        assert_eq!(adapter.next_transaction_id(), 0);
    }

    #[test]
    fn test_lqi_request_routes_to_coordinator() {
        let mut adapter = adapter(true);
        adapter.lqi_request(3, 0x1234, 2).unwrap();
        assert_eq!(adapter.coordinator().sent, vec![(ZDO_LQI_REQUEST, vec![3, 2])]);
    }

    #[test]
    fn test_rejected_request() {
        let mut adapter = adapter(false);
        let err = adapter.zdo_request(1, 0x0000, 0x0013, &[]).unwrap_err();
        assert!(matches!(err, AdapterError::RequestRejected { cluster_id: 0x0013 }));
    }

    #[test]
    fn test_bind_defaults_to_own_address() {
        let mut adapter = adapter(true);
        adapter.coordinator_ready(CoordinatorInfo {
            ieee_address: IeeeAddress::from_u64(0x0102_0304_0506_0708),
        });

        let request = BindRequest {
            device: IeeeAddress::from_u64(0xAA),
            src_endpoint: 1,
            cluster_id: zcl::CLUSTER_ON_OFF,
            destination: None,
            dst_endpoint: 0,
        };
        adapter.bind_request(5, 0x4321, &request).unwrap();

        let (cluster, payload) = &adapter.coordinator().sent[0];
        assert_eq!(*cluster, ZDO_BIND_REQUEST);
        assert_eq!(payload[12], ADDRESS_MODE_64_BIT);
        assert_eq!(&payload[13..21], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(payload[21], DEFAULT_DST_ENDPOINT);
    }

    #[test]
    fn test_serial_init_resets() {
        let mut adapter = adapter(true);
        let mut events = adapter.subscribe();
        let now = Instant::now();

        adapter.init(now);
        assert_eq!(adapter.state(), AdapterState::AwaitingReset);
        assert_eq!(adapter.reset_deadline(), Some(now + RESET_TIMEOUT));
        assert_eq!(events.try_recv().unwrap(), AdapterEvent::Reset);
    }
}
