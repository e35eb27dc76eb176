fn main() {
    // Bridge endpoint and WiFi credentials are baked in via option_env!.
    for var in [
        "BASKET_BRIDGE_HOST",
        "BASKET_BRIDGE_PORT",
        "BASKET_WIFI_SSID",
        "BASKET_WIFI_PASSWORD",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
