//! WiFi station and broker session tasks
//!
//! Three tasks run for the lifetime of the device:
//!
//! - [`connection_task`] keeps the station associated, reconnecting after
//!   every disconnect with a fixed pause.
//! - [`net_task`] drives the `embassy-net` stack.
//! - [`mqtt_task`] waits for an address, opens the broker session and runs
//!   ingest and the publisher side by side until either fails, then starts
//!   over.

use alloc::string::String;
use core::convert::Infallible;

use embassy_futures::select::{Either, select};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Ipv4Address, Runner, Stack};
use embassy_time::{Delay, Duration, Timer};
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};
use log::{error, info, warn};
use ratedeck_core::app_state::{AppError, SharedState};
use ratedeck_core::config::{BrokerConfig, InternetConfig};
use ratedeck_core::ingest::run_ingest;
use ratedeck_core::mqtt::{MqttReader, MqttWriter, handshake};
use ratedeck_core::publisher::run_publisher;

/// Pause before retrying a failed WiFi or broker connection
pub const RECONNECT_DELAY_MS: u64 = 5000;

/// Socket buffer size, each direction
pub const SOCKET_BUFFER_SIZE: usize = 1024;

/// MQTT packet buffer size, each direction; inbound payloads past the
/// ingest limit are dropped anyway
pub const MQTT_BUFFER_SIZE: usize = 512;

#[embassy_executor::task]
pub async fn connection_task(
    mut controller: WifiController<'static>,
    internet: InternetConfig<'static>,
) {
    info!("Starting WiFi connection task");
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("WiFi disconnected");
            Timer::after(Duration::from_millis(RECONNECT_DELAY_MS)).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(String::from(internet.ssid))
                    .with_password(String::from(internet.password)),
            );
            if let Err(e) = controller.set_config(&client_config) {
                error!("{}", AppError::describe(AppError::Wifi, &e));
                Timer::after(Duration::from_millis(RECONNECT_DELAY_MS)).await;
                continue;
            }
            info!("Starting WiFi");
            if let Err(e) = controller.start_async().await {
                error!("{}", AppError::describe(AppError::Wifi, &e));
                Timer::after(Duration::from_millis(RECONNECT_DELAY_MS)).await;
                continue;
            }
        }

        info!("Connecting to {}", internet.ssid);
        match controller.connect_async().await {
            Ok(()) => info!("WiFi connected"),
            Err(e) => {
                warn!("{}", AppError::describe(AppError::Wifi, &e));
                Timer::after(Duration::from_millis(RECONNECT_DELAY_MS)).await;
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

#[embassy_executor::task]
pub async fn mqtt_task(
    stack: Stack<'static>,
    broker: BrokerConfig<'static>,
    state: &'static SharedState,
) {
    let mut rx_buffer = [0u8; SOCKET_BUFFER_SIZE];
    let mut tx_buffer = [0u8; SOCKET_BUFFER_SIZE];

    loop {
        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            info!("Got IP address {}", config.address);
        }

        match run_session(stack, &broker, state, &mut rx_buffer, &mut tx_buffer).await {
            Ok(never) => match never {},
            Err(e) => error!("{}", e),
        }
        Timer::after(Duration::from_millis(RECONNECT_DELAY_MS)).await;
    }
}

/// Resolve the broker host, accepting a literal IPv4 address as-is
async fn resolve(stack: Stack<'static>, host: &str) -> Result<IpAddress, AppError> {
    if let Ok(address) = host.parse::<Ipv4Address>() {
        return Ok(IpAddress::Ipv4(address));
    }
    let addresses = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|e| AppError::describe(AppError::Broker, &e))?;
    addresses
        .first()
        .copied()
        .ok_or_else(|| AppError::describe(AppError::Broker, &"no address for broker host"))
}

/// One broker session: connect, subscribe, then ingest and publish until
/// the connection fails
async fn run_session(
    stack: Stack<'static>,
    broker: &BrokerConfig<'static>,
    state: &'static SharedState,
    rx_buffer: &mut [u8],
    tx_buffer: &mut [u8],
) -> Result<Infallible, AppError> {
    let address = resolve(stack, broker.host).await?;
    info!("Connecting to broker {}:{}", address, broker.port);

    let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(
        u64::from(broker.keep_alive_secs) * 2,
    )));
    socket
        .connect((address, broker.port))
        .await
        .map_err(|e| AppError::describe(AppError::Broker, &e))?;

    let (reader, writer) = socket.split();
    let mut reader = MqttReader::<_, MQTT_BUFFER_SIZE>::new(reader);
    let mut writer = MqttWriter::<_, MQTT_BUFFER_SIZE>::new(writer);

    handshake(&mut reader, &mut writer, &broker.connect_options(), broker.topic)
        .await
        .map_err(|e| AppError::describe(AppError::Broker, &e))?;

    let mut delay = Delay;
    let result = match select(
        run_ingest(&mut reader, broker.topic, state),
        run_publisher(&mut writer, broker.topic, state, &mut delay),
    )
    .await
    {
        Either::First(result) => result,
        Either::Second(result) => result,
    };

    match result {
        Ok(never) => match never {},
        Err(e) => Err(AppError::describe(AppError::Broker, &e)),
    }
}
