//! Injected browser wallet (`window.arweaveWallet`) via `wasm-bindgen`.
//!
//! Arweave.app and compatible extensions inject a global object whose
//! methods all return promises. The object is looked up on every call, so a
//! wallet that is installed or removed while the page is open is picked up.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::WalletError;
use crate::wallet::{balance_from_number, Permission, WalletProvider};

const GLOBAL_NAME: &str = "arweaveWallet";

/// `window.arweaveWallet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InjectedWallet;

impl InjectedWallet {
    pub fn new() -> Self {
        Self
    }

    fn handle() -> Option<JsValue> {
        let window = web_sys::window()?;
        let wallet = Reflect::get(&window, &JsValue::from_str(GLOBAL_NAME)).ok()?;
        if wallet.is_undefined() || wallet.is_null() {
            None
        } else {
            Some(wallet)
        }
    }

    async fn call(method: &str, args: &[JsValue]) -> Result<JsValue, WalletError> {
        let wallet = Self::handle().ok_or(WalletError::Unavailable)?;
        let func: Function = Reflect::get(&wallet, &JsValue::from_str(method))
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| WalletError::Provider(format!("{} is not supported", method)))?;

        let js_args = Array::new();
        for arg in args {
            js_args.push(arg);
        }
        let returned = func.apply(&wallet, &js_args).map_err(js_error)?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(js_error)
    }

    async fn call_string(method: &str, args: &[JsValue]) -> Result<String, WalletError> {
        let value = Self::call(method, args).await?;
        value
            .as_string()
            .ok_or_else(|| WalletError::Provider(format!("{} returned a non-string", method)))
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedWallet {
    fn is_present(&self) -> bool {
        Self::handle().is_some()
    }

    async fn connect(&self, permissions: &[Permission]) -> Result<(), WalletError> {
        let requested = Array::new();
        for p in permissions {
            requested.push(&JsValue::from_str(p.as_str()));
        }
        Self::call("connect", &[requested.into()]).await?;
        Ok(())
    }

    async fn active_address(&self) -> Result<String, WalletError> {
        Self::call_string("getActiveAddress", &[]).await
    }

    async fn balance(&self, address: &str) -> Result<String, WalletError> {
        let value = Self::call("getBalance", &[JsValue::from_str(address)]).await?;
        match value.as_string() {
            Some(s) => Ok(s),
            None => value
                .as_f64()
                .ok_or_else(|| WalletError::Provider("getBalance returned a non-number".into()))
                .and_then(balance_from_number),
        }
    }

    async fn active_public_key(&self) -> Result<String, WalletError> {
        Self::call_string("getActivePublicKey", &[]).await
    }

    async fn sign_message(&self, data: &[u8]) -> Result<Vec<u8>, WalletError> {
        let algorithm = Object::new();
        Reflect::set(&algorithm, &"name".into(), &"RSA-PSS".into()).map_err(js_error)?;
        Reflect::set(&algorithm, &"saltLength".into(), &JsValue::from_f64(32.0))
            .map_err(js_error)?;

        let payload = Uint8Array::from(data);
        let signature = Self::call("signature", &[payload.into(), algorithm.into()]).await?;
        Ok(Uint8Array::new(&signature).to_vec())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        Self::call("disconnect", &[]).await?;
        Ok(())
    }
}

fn js_error(value: JsValue) -> WalletError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    WalletError::Provider(message)
}
