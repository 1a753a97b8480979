#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::info;
use ratedeck_core::app_state::AppError;
use ratedeck_core::pages::PageManager;
use ratedeck_firmware::app_state::{
    SHARED_STATE, create_i2c_bus, init_display, init_gesture_sensor,
};
use ratedeck_firmware::network::{connection_task, mqtt_task, net_task};
use ratedeck_firmware::wifi_secrets;
use rtt_target::rprintln;
use static_cell::StaticCell;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rprintln!("PANIC: {}", info);
    esp_hal::system::software_reset()
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    let device_config = wifi_secrets::config();

    // Radio and network stack
    let radio = RADIO.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    let rng = Rng::new();
    let seed = u64::from(rng.random()) << 32 | u64::from(rng.random());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::<3>::new()),
        seed,
    );

    spawner
        .spawn(connection_task(wifi_controller, device_config.internet))
        .unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner
        .spawn(mqtt_task(stack, device_config.broker, &SHARED_STATE))
        .unwrap();

    // Display and gesture sensor
    let mut display = init_display(
        peripherals.SPI2,
        peripherals.GPIO18,
        peripherals.GPIO23,
        peripherals.GPIO5,
        peripherals.GPIO27,
        peripherals.GPIO17,
    );
    let i2c = create_i2c_bus(peripherals.I2C0, peripherals.GPIO25, peripherals.GPIO26);
    let mut sensor = init_gesture_sensor(i2c).await;

    info!("Starting UI");
    let mut manager = PageManager::new(&SHARED_STATE);
    match manager
        .run(&mut sensor, &mut display, &mut embassy_time::Delay)
        .await
    {
        Ok(never) => match never {},
        Err(e) => panic!("{}", AppError::describe(AppError::Display, &e)),
    }
}
