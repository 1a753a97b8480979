use serde::{Deserialize, Serialize};

use crate::mqtt::ConnectOptions;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    pub broker: BrokerConfig<'a>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

/// Where the rate feed lives and how to log in to it
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct BrokerConfig<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Topic used for both inbound `[DATA]` and outbound `[CURRENCY]`
    pub topic: &'a str,
    pub client_id: &'a str,
    pub keep_alive_secs: u16,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl Default for BrokerConfig<'_> {
    fn default() -> Self {
        Self {
            host: "broker.emqx.io",
            port: 1883,
            topic: "test",
            client_id: "ratedeck",
            keep_alive_secs: 60,
            username: None,
            password: None,
        }
    }
}

impl<'a> BrokerConfig<'a> {
    pub fn connect_options(&self) -> ConnectOptions<'a> {
        ConnectOptions {
            client_id: self.client_id,
            keep_alive_secs: self.keep_alive_secs,
            username: self.username,
            password: self.password,
        }
    }
}
