//! Workflow engine orchestration.
//!
//! The engine ties the record store, the client directory, the geocoder
//! and the state machine together behind the operations the counter and
//! the delivery run actually use: registering orders, working through a
//! status board, and assembling the day's delivery board.

use crate::clients::{ClientDirectory, DirectoryError};
use crate::delivery::group_for_delivery;
use crate::routing::{navigation_url, sequence_by_distance};
use crate::state::{OrderStateError, OrderStateMachine, StatusView};
use lavadero_config::Config;
use lavadero_geo::GeocodeService;
use lavadero_storage::{StorageError, StorageService};
use lavadero_types::{
	Client, DeliveryGroup, GeoPoint, LineItem, Order, OrderStatus, StorageKey,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Validation error: {0}")]
	Validation(String),
	#[error("Storage error: {0}")]
	Storage(String),
	#[error(transparent)]
	State(#[from] OrderStateError),
}

impl From<StorageError> for EngineError {
	fn from(e: StorageError) -> Self {
		EngineError::Storage(e.to_string())
	}
}

impl From<DirectoryError> for EngineError {
	fn from(e: DirectoryError) -> Self {
		EngineError::Storage(e.to_string())
	}
}

/// Everything the counter captures when a client drops off laundry.
#[derive(Debug, Clone, Default)]
pub struct OrderIntake {
	/// Client phone; blank means the order is registered anonymously.
	pub client_phone: Option<String>,
	/// Client name, recorded in the directory when a phone is given.
	pub client_name: String,
	/// Delivery address, recorded in the directory when a phone is given.
	pub client_address: String,
	/// Itemized articles; may be empty for flat-priced orders.
	pub line_items: Vec<LineItem>,
	/// Flat total, used when no line items are captured.
	pub total_amount: Decimal,
	/// Optional photo of the intake ticket.
	pub photo_url: Option<String>,
}

/// The sequenced delivery run for the orders currently in Entregar.
#[derive(Debug)]
pub struct DeliveryBoard {
	/// One stop per client, nearest-first where distances are known.
	pub groups: Vec<DeliveryGroup>,
	/// Resolved business origin, if geocoding has ever succeeded.
	pub origin: Option<GeoPoint>,
	/// Directions link for the run; `None` without origin or positioned
	/// stops.
	pub route_url: Option<String>,
}

/// Orchestrates the laundry workflow over its backing services.
pub struct WorkflowEngine {
	config: Config,
	storage: Arc<StorageService>,
	geocode: Arc<GeocodeService>,
	state: OrderStateMachine,
	directory: ClientDirectory,
}

impl WorkflowEngine {
	pub fn new(config: Config, storage: Arc<StorageService>, geocode: Arc<GeocodeService>) -> Self {
		Self {
			state: OrderStateMachine::new(storage.clone()),
			directory: ClientDirectory::new(storage.clone()),
			config,
			storage,
			geocode,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn state(&self) -> &OrderStateMachine {
		&self.state
	}

	pub fn directory(&self) -> &ClientDirectory {
		&self.directory
	}

	/// Registers a new order, assigning the next ticket number.
	///
	/// New orders always start in Lavar. When a phone is given the client
	/// record is upserted with the intake's name and address, keeping any
	/// previously resolved position.
	pub async fn register_order(&self, intake: OrderIntake) -> Result<Order, EngineError> {
		let phone = intake
			.client_phone
			.as_deref()
			.map(str::trim)
			.filter(|p| !p.is_empty())
			.map(str::to_string);

		if intake.line_items.is_empty() && intake.total_amount < Decimal::ZERO {
			return Err(EngineError::Validation(
				"Order total cannot be negative".into(),
			));
		}
		if intake
			.line_items
			.iter()
			.any(|item| item.article.trim().is_empty())
		{
			return Err(EngineError::Validation(
				"Line items must name an article".into(),
			));
		}
		if intake
			.line_items
			.iter()
			.any(|item| item.unit_price < Decimal::ZERO)
		{
			return Err(EngineError::Validation(
				"Line item prices cannot be negative".into(),
			));
		}

		let nro = self.next_ticket().await?;
		let now = Self::now();
		let order = Order {
			nro,
			client_phone: phone.clone(),
			total_amount: intake.total_amount,
			status: OrderStatus::Lavar,
			paid: false,
			line_items: intake.line_items,
			photo_url: intake.photo_url,
			created_at: now,
			updated_at: now,
		};
		self.state.store_order(&order).await?;

		if let Some(phone) = phone {
			let mut client = self
				.directory
				.get(&phone)
				.await?
				.unwrap_or_else(|| Client::new(phone.clone(), "", ""));
			if !intake.client_name.trim().is_empty() {
				client.name = intake.client_name.trim().to_string();
			}
			if !intake.client_address.trim().is_empty() {
				// A changed address invalidates the cached position.
				if client.address != intake.client_address.trim() {
					client.position = None;
				}
				client.address = intake.client_address.trim().to_string();
			}
			self.directory.upsert(&client).await?;
		}

		tracing::info!(order = order.nro, total = %order.total(), "Order registered");
		Ok(order)
	}

	/// Loads the board for one status.
	pub async fn orders_with_status(&self, status: OrderStatus) -> Result<StatusView, EngineError> {
		let orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		Ok(StatusView::new(status, orders))
	}

	/// Assembles the delivery board for everything in Entregar.
	///
	/// Groups the pending-delivery orders per client, enriches missing
	/// client positions through the geocoder, sequences the stops
	/// nearest-first from the business origin and renders the navigation
	/// link. Geocoding problems degrade stop by stop; they never fail the
	/// board.
	pub async fn delivery_board(&self) -> Result<DeliveryBoard, EngineError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		orders.retain(|o| o.status == OrderStatus::Entregar);
		orders.sort_by_key(|o| o.nro);

		let mut directory = self.directory.all().await?;
		for phone in orders
			.iter()
			.map(Order::phone_key)
			.filter(|p| !p.is_empty())
		{
			if let Some(client) = directory.get_mut(phone) {
				if let Err(e) = self
					.directory
					.ensure_position(client, &self.geocode)
					.await
				{
					tracing::warn!(phone, error = %e, "Could not persist client position");
				}
			}
		}

		let mut groups = group_for_delivery(orders, &directory);

		let origin = self
			.geocode
			.origin(&self.storage, &self.config.business.origin_address)
			.await;
		sequence_by_distance(&mut groups, origin);

		let route_url = origin
			.and_then(|from| navigation_url(from, &groups, self.config.routing.max_waypoints));

		Ok(DeliveryBoard {
			groups,
			origin,
			route_url,
		})
	}

	/// The next free ticket number.
	async fn next_ticket(&self) -> Result<u64, EngineError> {
		let orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		Ok(orders.iter().map(|o| o.nro).max().unwrap_or(0) + 1)
	}

	fn now() -> u64 {
		std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.unwrap_or_default()
			.as_secs()
	}
}
