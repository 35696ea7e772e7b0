//! Transaction assembly from UTXO entries.
//!
//! `TransactionBuilder` collects inputs, outputs, a fee and an optional
//! change script, then produces an unsigned `SignableTransaction` in which
//! `sum(outputs) + fee == sum(inputs)`. Change below the dust threshold is
//! never created; it is added to the fee instead. Once a builder has
//! produced a transaction for signing it is sealed and rejects mutation.

use std::collections::HashSet;

use kas_script::{pay_to_address_script, Address, ScriptPublicKey};

use crate::config::{BuilderConfig, MAX_SOMPI};
use crate::input::TransactionInput;
use crate::mass;
use crate::output::TransactionOutput;
use crate::sighash::SigHashType;
use crate::signer::{sign_transaction, SigningKey};
use crate::transaction::{SignableTransaction, Transaction};
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Outputs assumed by fee estimation in `build_from_utxos`: recipient and change.
const ESTIMATED_OUTPUT_COUNT: usize = 2;

/// Incremental transaction builder.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    config: BuilderConfig,
    entries: Vec<UtxoEntry>,
    outputs: Vec<TransactionOutput>,
    fee: u64,
    change_script: Option<ScriptPublicKey>,
    payload: Vec<u8>,
    lock_time: u64,
    sealed: bool,
}

impl TransactionBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        TransactionBuilder {
            config,
            entries: Vec::new(),
            outputs: Vec::new(),
            fee: 0,
            change_script: None,
            payload: Vec::new(),
            lock_time: 0,
            sealed: false,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Whether the builder has handed its transaction to signing.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn ensure_open(&self) -> Result<(), TransactionError> {
        if self.sealed {
            return Err(TransactionError::ValidationError(
                "transaction is sealed for signing".to_string(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------

    /// Spend a UTXO entry.
    ///
    /// # Returns
    /// `InvalidAmount` if the entry amount exceeds the maximum supply or the
    /// input total would overflow, `ValidationError` if the outpoint is
    /// already spent by this builder or the builder is sealed.
    pub fn add_input(&mut self, utxo: UtxoEntry) -> Result<&mut Self, TransactionError> {
        self.ensure_open()?;
        if utxo.amount > MAX_SOMPI {
            return Err(TransactionError::InvalidAmount(format!(
                "input amount {} exceeds maximum supply",
                utxo.amount
            )));
        }
        if self.entries.iter().any(|e| e.outpoint == utxo.outpoint) {
            return Err(TransactionError::ValidationError(format!(
                "outpoint {} is already spent by this transaction",
                utxo.outpoint
            )));
        }
        self.total_input()?
            .checked_add(utxo.amount)
            .ok_or_else(|| TransactionError::InvalidAmount("input total overflows".to_string()))?;
        self.entries.push(utxo);
        Ok(self)
    }

    // -----------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------

    fn check_amount(&self, amount: u64) -> Result<(), TransactionError> {
        if amount == 0 {
            return Err(TransactionError::InvalidAmount("output amount is zero".to_string()));
        }
        if amount < self.config.dust_threshold {
            return Err(TransactionError::InvalidAmount(format!(
                "output amount {} is below the dust threshold {}",
                amount, self.config.dust_threshold
            )));
        }
        if amount > MAX_SOMPI {
            return Err(TransactionError::InvalidAmount(format!(
                "output amount {} exceeds maximum supply",
                amount
            )));
        }
        Ok(())
    }

    /// Pay `amount` sompi to a locking script.
    ///
    /// # Returns
    /// `InvalidAmount` for zero, sub-dust or oversized amounts and
    /// overflowing totals; `ValidationError` once a change output has been
    /// requested or the builder is sealed.
    pub fn add_output(
        &mut self,
        script_public_key: ScriptPublicKey,
        amount: u64,
    ) -> Result<&mut Self, TransactionError> {
        self.ensure_open()?;
        if self.change_script.is_some() {
            return Err(TransactionError::ValidationError(
                "outputs cannot be added after the change output".to_string(),
            ));
        }
        self.check_amount(amount)?;
        self.total_output()?
            .checked_add(amount)
            .ok_or_else(|| TransactionError::InvalidAmount("output total overflows".to_string()))?;
        self.outputs.push(TransactionOutput::new(amount, script_public_key));
        Ok(self)
    }

    /// Pay `amount` sompi to an address of the configured network.
    pub fn add_output_to_address(
        &mut self,
        address: &Address,
        amount: u64,
    ) -> Result<&mut Self, TransactionError> {
        self.config.check_address(address)?;
        self.add_output(pay_to_address_script(address), amount)
    }

    /// Send whatever the inputs provide beyond the outputs and the fee to
    /// `script_public_key`.
    ///
    /// Must be the last output added. The change amount is computed when the
    /// transaction is built, so it always reflects the final fee.
    pub fn add_change_output(
        &mut self,
        script_public_key: ScriptPublicKey,
    ) -> Result<&mut Self, TransactionError> {
        self.ensure_open()?;
        if self.change_script.is_some() {
            return Err(TransactionError::ValidationError(
                "change output already added".to_string(),
            ));
        }
        self.change_script = Some(script_public_key);
        Ok(self)
    }

    /// Send change to an address of the configured network.
    pub fn add_change_address(&mut self, address: &Address) -> Result<&mut Self, TransactionError> {
        self.config.check_address(address)?;
        self.add_change_output(pay_to_address_script(address))
    }

    // -----------------------------------------------------------------
    // Other fields
    // -----------------------------------------------------------------

    /// Set the fee in sompi. May be called repeatedly until the builder is sealed.
    pub fn set_fee(&mut self, fee: u64) -> Result<&mut Self, TransactionError> {
        self.ensure_open()?;
        if fee > MAX_SOMPI {
            return Err(TransactionError::InvalidAmount(format!(
                "fee {} exceeds maximum supply",
                fee
            )));
        }
        self.fee = fee;
        Ok(self)
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<&mut Self, TransactionError> {
        self.ensure_open()?;
        self.payload = payload;
        Ok(self)
    }

    pub fn set_lock_time(&mut self, lock_time: u64) -> Result<&mut Self, TransactionError> {
        self.ensure_open()?;
        self.lock_time = lock_time;
        Ok(self)
    }

    // -----------------------------------------------------------------
    // Totals & estimation
    // -----------------------------------------------------------------

    /// The fee requested with `set_fee`. Folded dust change comes on top.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn total_input(&self) -> Result<u64, TransactionError> {
        self.entries.iter().try_fold(0u64, |acc, e| {
            acc.checked_add(e.amount)
                .ok_or_else(|| TransactionError::InvalidAmount("input total overflows".to_string()))
        })
    }

    pub fn total_output(&self) -> Result<u64, TransactionError> {
        self.outputs.iter().try_fold(0u64, |acc, o| {
            acc.checked_add(o.value)
                .ok_or_else(|| TransactionError::InvalidAmount("output total overflows".to_string()))
        })
    }

    /// Estimated mass of the transaction once signed, counting the change
    /// output if one was requested.
    pub fn estimate_mass(&self) -> u64 {
        let outputs = self.outputs.len() + usize::from(self.change_script.is_some());
        mass::estimate_mass(self.entries.len(), outputs, self.payload.len())
    }

    /// Smallest fee the configured fee rate allows for this transaction.
    /// Advisory: `set_fee` accepts any value.
    pub fn minimum_fee(&self) -> u64 {
        mass::minimum_fee(self.estimate_mass(), self.config.fee_rate)
    }

    // -----------------------------------------------------------------
    // Build & sign
    // -----------------------------------------------------------------

    /// Produce the unsigned transaction and seal the builder.
    ///
    /// Inputs carry empty signature scripts and the configured default
    /// sequence. If a change output was requested, the change is created
    /// when it reaches the dust threshold and folded into the fee otherwise.
    ///
    /// # Returns
    /// The transaction paired with its spent entries, `ValidationError`
    /// without inputs, or `InsufficientFunds{required, available}` where
    /// `required` is the output total plus the fee.
    pub fn build(&mut self) -> Result<SignableTransaction, TransactionError> {
        if self.entries.is_empty() {
            return Err(TransactionError::ValidationError("transaction has no inputs".to_string()));
        }

        let available = self.total_input()?;
        let required = self
            .total_output()?
            .checked_add(self.fee)
            .ok_or_else(|| TransactionError::InvalidAmount("output total plus fee overflows".to_string()))?;
        let change = available
            .checked_sub(required)
            .ok_or(TransactionError::InsufficientFunds { required, available })?;

        let mut tx = Transaction::new();
        tx.lock_time = self.lock_time;
        tx.payload = self.payload.clone();
        for entry in &self.entries {
            tx.add_input(TransactionInput::new(entry.outpoint, self.config.default_sequence));
        }
        tx.outputs = self.outputs.clone();

        if let Some(change_script) = &self.change_script {
            if change >= self.config.dust_threshold {
                tx.add_output(TransactionOutput::new(change, change_script.clone()));
            } else if change > 0 {
                tracing::debug!(change, dust_threshold = self.config.dust_threshold, "change below dust folded into fee");
            }
        }

        let signable = SignableTransaction::new(tx, self.entries.clone())?;
        self.sealed = true;
        tracing::debug!(
            inputs = signable.tx.inputs.len(),
            outputs = signable.tx.outputs.len(),
            fee = available - signable.tx.total_output_value()?,
            "built transaction"
        );
        Ok(signable)
    }

    /// Build the transaction and sign every input.
    ///
    /// The builder is sealed even if signing fails.
    pub fn sign(
        &mut self,
        keys: &[SigningKey],
        hash_type: SigHashType,
    ) -> Result<SignableTransaction, TransactionError> {
        let signable = self.build()?;
        sign_transaction(&signable, keys, hash_type)
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

// ---------------------------------------------------------------------------
// One-shot construction
// ---------------------------------------------------------------------------

/// Spend one UTXO to a recipient, returning change to `change_script`.
///
/// # Arguments
/// * `utxo` - The entry to spend.
/// * `recipient_script` - Locking script of the recipient.
/// * `output_amount` - Sompi paid to the recipient.
/// * `fee` - Sompi left to the fee.
/// * `change_script` - Locking script receiving the change.
/// * `config` - Dust threshold, default sequence and network.
///
/// # Returns
/// The unsigned transaction, or `InsufficientFunds` when
/// `utxo.amount < output_amount + fee`.
pub fn build_transaction(
    utxo: &UtxoEntry,
    recipient_script: &ScriptPublicKey,
    output_amount: u64,
    fee: u64,
    change_script: &ScriptPublicKey,
    config: &BuilderConfig,
) -> Result<SignableTransaction, TransactionError> {
    let mut builder = TransactionBuilder::new(config.clone());
    builder
        .add_input(utxo.clone())?
        .add_output(recipient_script.clone(), output_amount)?
        .set_fee(fee)?
        .add_change_output(change_script.clone())?;
    builder.build()
}

/// Pick UTXOs covering `target`, largest first.
///
/// # Returns
/// At least one entry whose amounts sum to `target` or more, or
/// `InsufficientFunds` carrying the total available.
pub fn select_utxos(utxos: &[UtxoEntry], target: u64) -> Result<Vec<UtxoEntry>, TransactionError> {
    let mut sorted: Vec<&UtxoEntry> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    let mut total = 0u64;
    for entry in sorted {
        if total >= target && !selected.is_empty() {
            break;
        }
        if !seen.insert(entry.outpoint) {
            continue;
        }
        total = total.saturating_add(entry.amount);
        selected.push(entry.clone());
    }

    if total < target || selected.is_empty() {
        return Err(TransactionError::InsufficientFunds {
            required: target,
            available: total,
        });
    }
    Ok(selected)
}

/// Pay `amount` to a recipient from a set of UTXOs, paying the minimum fee
/// for the resulting mass and returning change to `change_script`.
///
/// The fee is re-estimated each time the selection grows, so the selected
/// inputs always cover the amount and the fee of their own mass.
pub fn build_from_utxos(
    utxos: &[UtxoEntry],
    recipient_script: &ScriptPublicKey,
    amount: u64,
    change_script: &ScriptPublicKey,
    config: &BuilderConfig,
) -> Result<SignableTransaction, TransactionError> {
    let mut fee = 0u64;
    for _ in 0..=utxos.len() {
        let target = amount
            .checked_add(fee)
            .ok_or_else(|| TransactionError::InvalidAmount("amount plus fee overflows".to_string()))?;
        let selected = select_utxos(utxos, target)?;
        let needed = mass::minimum_fee(
            mass::estimate_mass(selected.len(), ESTIMATED_OUTPUT_COUNT, 0),
            config.fee_rate,
        );
        if needed <= fee {
            let mut builder = TransactionBuilder::new(config.clone());
            for entry in selected {
                builder.add_input(entry)?;
            }
            builder
                .add_output(recipient_script.clone(), amount)?
                .set_fee(fee)?
                .add_change_output(change_script.clone())?;
            return builder.build();
        }
        fee = needed;
    }
    Err(TransactionError::InternalError(
        "fee estimation did not converge".to_string(),
    ))
}
