//! NimBLE GATT server publishing the weight
//!
//! One service with a notify characteristic (TX) carrying the weight text
//! and a write characteristic (RX) kept for clients that expect the UART
//! layout. Link changes are posted as `LinkEvent`s; the device cycle owns
//! the reaction to them, including when to advertise again.

use crate::hardware::traits::WeightLink;
use crate::protocol::{uuid_to_le_bytes, RX_CHAR_UUID, SERVICE_UUID, TX_CHAR_UUID};
use crate::system::events::{post_link_event, LinkEvent, LinkEventChannel};
use crate::types::DeviceError;
use esp32_nimble::{
    utilities::{mutex::Mutex, BleUuid},
    BLEAdvertisementData, BLEAdvertising, BLECharacteristic, BLEDevice, NimbleProperties,
};
use log::{debug, info};
use std::sync::Arc;

fn nimble_uuid(uuid: &uuid::Uuid) -> BleUuid {
    BleUuid::from_uuid128(uuid_to_le_bytes(uuid))
}

pub struct BleWeightServer {
    tx_characteristic: Arc<Mutex<BLECharacteristic>>,
    advertising: &'static Mutex<BLEAdvertising>,
}

impl BleWeightServer {
    pub fn start(device_name: &str, link_events: Arc<LinkEventChannel>) -> Result<Self, DeviceError> {
        info!("Starting BLE GATT server as '{}'", device_name);

        let device = BLEDevice::take();
        BLEDevice::set_device_name(device_name)
            .map_err(|e| DeviceError::Ble(format!("Failed to set device name: {:?}", e)))?;

        let server = device.get_server();
        // Advertising resumes from the device cycle after a disconnect
        server.advertise_on_disconnect(false);

        let connect_events = Arc::clone(&link_events);
        server.on_connect(move |_server, desc| {
            info!("Client connected: {:?}", desc);
            post_link_event(&connect_events, LinkEvent::Connected);
        });

        let disconnect_events = Arc::clone(&link_events);
        server.on_disconnect(move |desc, reason| {
            info!("Client {:?} disconnected ({:?})", desc, reason);
            post_link_event(&disconnect_events, LinkEvent::Disconnected);
        });

        let service = server.create_service(nimble_uuid(&SERVICE_UUID));

        let tx_characteristic = service
            .lock()
            .create_characteristic(nimble_uuid(&TX_CHAR_UUID), NimbleProperties::NOTIFY);

        let rx_characteristic = service
            .lock()
            .create_characteristic(nimble_uuid(&RX_CHAR_UUID), NimbleProperties::WRITE);
        rx_characteristic.lock().on_write(|args| {
            debug!("Ignoring {} byte write on RX", args.recv_data().len());
        });

        let advertising = device.get_advertising();
        advertising
            .lock()
            .set_data(
                BLEAdvertisementData::new()
                    .name(device_name)
                    .add_service_uuid(nimble_uuid(&SERVICE_UUID)),
            )
            .map_err(|e| DeviceError::Ble(format!("Failed to set advertising data: {:?}", e)))?;
        advertising
            .lock()
            .start()
            .map_err(|e| DeviceError::Ble(format!("Failed to start advertising: {:?}", e)))?;

        info!("Waiting for a client connection to notify...");

        Ok(Self {
            tx_characteristic,
            advertising,
        })
    }
}

impl WeightLink for BleWeightServer {
    fn notify(&mut self, payload: &[u8]) -> Result<(), DeviceError> {
        self.tx_characteristic.lock().set_value(payload).notify();
        Ok(())
    }

    fn restart_advertising(&mut self) -> Result<(), DeviceError> {
        self.advertising
            .lock()
            .start()
            .map_err(|e| DeviceError::Ble(format!("Failed to restart advertising: {:?}", e)))?;
        info!("Advertising restarted");
        Ok(())
    }
}
