//! The assembled network for analyzing a sounding.
//!
//! Given temperature and dew point profiles, a reference pressure and temperature, a minimum
//! pressure, and a [`ParcelMode`], the network lifts a parcel and finds its LCL, LFC, LNB, CAPE
//! and CIN. Every intermediate result is a slot in the underlying [`Network`] and can be read
//! through the handles in [`AerologicalRefs`].
//!
//! A wind profile is optional. When present, the wind at the reference pressure is available, and
//! nothing else depends on it.
use crate::{
    cells::{energy, levels, profile_ops, select, thermo, trajectory},
    error::Result,
    keys::ParcelMode,
    network::{Network, Ref, Update},
    quantity::{Kind, Profile, Quantity, Scalar},
};
use metfor::{Celsius, HectoPascal, JpKg, Kelvin, Knots, Quantity as _, WindSpdDir, WindUV};
use optional::Optioned;
use tracing::debug;

/// Handles to the inputs and outputs of an [`AerologicalNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AerologicalRefs {
    /// Environment temperature profile (input).
    pub temperature_profile: Ref,
    /// Environment dew point profile (input).
    pub dew_point_profile: Ref,
    /// Reference pressure (input).
    pub reference_pressure: Ref,
    /// Reference temperature (input).
    pub reference_temperature: Ref,
    /// Pressure the wet trajectory is lifted to (input).
    pub minimum_pressure: Ref,
    /// Parcel mode index (input).
    pub parcel_mode: Ref,
    /// Eastward wind component profile (optional input).
    pub eastward_wind_profile: Ref,
    /// Northward wind component profile (optional input).
    pub northward_wind_profile: Ref,

    /// `(eastward, northward)` wind at the reference pressure.
    pub profile_wind: Ref,
    /// Profile temperature at the reference pressure.
    pub profile_temperature: Ref,
    /// Profile dew point at the reference pressure.
    pub profile_dew_point: Ref,
    /// Profile mixing ratio at the reference pressure.
    pub profile_mixing_ratio: Ref,

    /// Starting pressure of the parcel.
    pub parcel_pressure: Ref,
    /// Starting temperature of the parcel.
    pub parcel_temperature: Ref,
    /// Mixing ratio of the parcel.
    pub parcel_mixing_ratio: Ref,

    /// LCL temperature.
    pub lcl_temperature: Ref,
    /// LCL pressure.
    pub lcl_pressure: Ref,
    /// Dry adiabatic trajectory from the parcel to the LCL.
    pub dry_trajectory: Ref,
    /// Pseudo-adiabatic trajectory from the LCL to the minimum pressure.
    pub wet_trajectory: Ref,
    /// Virtual temperature along the dry trajectory.
    pub dry_virtual_temperature: Ref,
    /// Virtual temperature along the wet trajectory.
    pub wet_virtual_temperature: Ref,
    /// Virtual temperature of the parcel along its whole path.
    pub parcel_virtual_temperature: Ref,
    /// Environment virtual temperature profile.
    pub environment_virtual_temperature: Ref,
    /// Buoyancy of the parcel, missing samples removed.
    pub buoyancy: Ref,

    /// Level of free convection.
    pub lfc: Ref,
    /// Environment temperature at the LFC.
    pub lfc_temperature: Ref,
    /// Level of neutral buoyancy.
    pub lnb: Ref,
    /// Environment temperature at the LNB.
    pub lnb_temperature: Ref,
    /// Energy profile of the buoyancy.
    pub energy_profile: Ref,
    /// CAPE.
    pub cape: Ref,
    /// CIN.
    pub cin: Ref,

    /// `(pressure, temperature)` of the LCL.
    pub lcl_point: Ref,
    /// `(pressure, temperature)` of the LFC.
    pub lfc_point: Ref,
    /// `(pressure, temperature)` of the LNB.
    pub lnb_point: Ref,
}

/// A configured network of cells computing parcel diagnostics for a sounding.
#[derive(Debug)]
pub struct AerologicalNetwork {
    net: Network,
    refs: AerologicalRefs,
}

impl AerologicalNetwork {
    /// Build and configure the network. Every input starts out missing and the parcel mode is
    /// [`ParcelMode::Bottom`].
    pub fn new() -> Result<Self> {
        let mut net = Network::new();

        let missing = |kind| Quantity::Scalar(Scalar::missing(kind));

        //
        // Inputs
        //
        let temp = net.source(
            "temperature profile",
            Profile::missing(Kind::AirTemperature).into(),
        );
        let dew = net.source(
            "dew point profile",
            Profile::missing(Kind::DewPoint).into(),
        );
        let pres = net.source("reference pressure", missing(Kind::AirPressure));
        let ref_temp = net.source("reference temperature", missing(Kind::AirTemperature));
        let min_pres = net.source("minimum pressure", missing(Kind::AirPressure));
        let mode = net.source(
            "parcel mode",
            Quantity::index(ParcelMode::default().index()),
        );
        let wind_u = net.source(
            "eastward wind profile",
            Profile::missing(Kind::EastwardWind).into(),
        );
        let wind_v = net.source(
            "northward wind profile",
            Profile::missing(Kind::NorthwardWind).into(),
        );

        //
        // Wind at the reference pressure
        //
        let u_at_pres = net.add(profile_ops::evaluator(wind_u, pres, Kind::EastwardWind)?)?;
        let v_at_pres = net.add(profile_ops::evaluator(wind_v, pres, Kind::NorthwardWind)?)?;
        let wind_at_pres =
            net.add(select::tupler(&net, &[u_at_pres, v_at_pres])?.named("profile wind"))?;

        //
        // Candidates for the parcel's starting point
        //
        let max_pres = net.add(profile_ops::max_pressure(temp)?)?;
        let theta_pro = net.add(thermo::potential_temperature_profile(temp)?)?;
        let mean_theta = net.add(profile_ops::layer_mean_cell(
            theta_pro,
            max_pres,
            pres,
            Kind::PotentialTemperature,
        )?)?;
        let mean_pres = net.add(profile_ops::layer_mid_pressure(max_pres, pres)?)?;
        let mean_temp = net.add(thermo::temperature_from_theta(mean_pres, mean_theta)?)?;

        let mw_pro = net.add(thermo::mixing_ratio_profile(dew)?)?;
        let mean_mw = net.add(profile_ops::layer_mean_cell(
            mw_pro,
            max_pres,
            pres,
            Kind::MixingRatio,
        )?)?;

        let dew_at_pres = net.add(
            profile_ops::evaluator(dew, pres, Kind::DewPoint)?.named("profile dew point"),
        )?;
        let mw_at_pres = net.add(
            thermo::mixing_ratio(dew_at_pres, pres)?.named("profile mixing ratio"),
        )?;
        let temp_at_pres = net.add(
            profile_ops::evaluator(temp, pres, Kind::AirTemperature)?
                .named("profile temperature"),
        )?;
        let temp_at_max = net.add(profile_ops::evaluator(
            temp,
            max_pres,
            Kind::AirTemperature,
        )?)?;
        let mw_at_max = net.add(profile_ops::evaluator(
            mw_pro,
            max_pres,
            Kind::MixingRatio,
        )?)?;

        //
        // The parcel, chosen by mode: point, layer, bottom, pressure
        //
        let parcel_pres = net.add(
            select::selector(&net, mode, &[pres, mean_pres, max_pres, pres])?
                .named("parcel pressure"),
        )?;
        let parcel_temp = net.add(
            select::selector(&net, mode, &[ref_temp, mean_temp, temp_at_max, temp_at_pres])?
                .named("parcel temperature"),
        )?;
        let parcel_mw = net.add(
            select::selector(&net, mode, &[mw_at_pres, mean_mw, mw_at_max, mw_at_pres])?
                .named("parcel mixing ratio"),
        )?;

        //
        // Lift it
        //
        let lcl_temp = net.add(thermo::lcl_temperature_cell(
            parcel_mw,
            parcel_pres,
            parcel_temp,
        )?)?;
        let lcl_pres = net.add(thermo::lcl_pressure_cell(
            parcel_pres,
            parcel_temp,
            lcl_temp,
        )?)?;
        let dry = net.add(trajectory::dry_trajectory(parcel_pres, parcel_temp, lcl_pres)?)?;
        let wet = net.add(trajectory::wet_trajectory(lcl_pres, lcl_temp, min_pres)?)?;

        //
        // Buoyancy
        //
        let dry_vt = net.add(
            thermo::virtual_temperature_profile_cell(dry, parcel_mw)?
                .named("dry virtual temperature"),
        )?;
        let wet_vt = net.add(
            thermo::virtual_temperature_profile_cell(wet, wet)?.named("wet virtual temperature"),
        )?;
        let parcel_vt = net.add(
            profile_ops::combiner(dry_vt, wet_vt, Kind::VirtualTemperature)?
                .named("parcel virtual temperature"),
        )?;
        let parcel_den = net.add(
            thermo::air_density_profile(parcel_vt)?.named("parcel density"),
        )?;

        let env_vt = net.add(
            thermo::virtual_temperature_profile_cell(temp, dew)?
                .named("environment virtual temperature"),
        )?;
        let parcel_domain = net.add(profile_ops::domain_extractor(parcel_vt)?)?;
        let env_vt_on_parcel = net.add(profile_ops::domain_evaluator(
            env_vt,
            parcel_domain,
            Kind::VirtualTemperature,
        )?)?;
        let env_den = net.add(
            thermo::air_density_profile(env_vt_on_parcel)?.named("environment density"),
        )?;

        let raw_buoyancy = net.add(thermo::buoyancy(env_den, parcel_den)?)?;
        let buoyancy = net.add(
            profile_ops::cleaner(raw_buoyancy, Kind::MassicVolume)?.named("buoyancy"),
        )?;

        //
        // Levels and energy
        //
        let lfc = net.add(levels::lfc(buoyancy)?)?;
        let lfc_temp = net.add(
            profile_ops::evaluator(temp, lfc, Kind::AirTemperature)?.named("lfc temperature"),
        )?;
        let lnb = net.add(levels::lnb(buoyancy)?)?;
        let lnb_temp = net.add(
            profile_ops::evaluator(temp, lnb, Kind::AirTemperature)?.named("lnb temperature"),
        )?;

        let energy_pro = net.add(energy::energy_profile_cell(buoyancy)?)?;
        let positive = net.add(energy::positive_buoyancy(buoyancy)?)?;
        let positive_energy = net.add(
            energy::energy_profile_cell(positive)?.named("positive energy profile"),
        )?;
        let cape = net.add(energy::cape_cell(positive_energy, lfc, lnb)?)?;
        let cin = net.add(energy::cin_cell(energy_pro, parcel_pres, lfc)?)?;

        //
        // Points for display
        //
        let lcl_point = net.add(select::tupler(&net, &[lcl_pres, lcl_temp])?.named("lcl point"))?;
        let lfc_point = net.add(select::tupler(&net, &[lfc, lfc_temp])?.named("lfc point"))?;
        let lnb_point = net.add(select::tupler(&net, &[lnb, lnb_temp])?.named("lnb point"))?;

        net.configure()?;
        debug!(cells = net.cell_count(), "aerological network built");

        Ok(AerologicalNetwork {
            net,
            refs: AerologicalRefs {
                temperature_profile: temp,
                dew_point_profile: dew,
                reference_pressure: pres,
                reference_temperature: ref_temp,
                minimum_pressure: min_pres,
                parcel_mode: mode,
                eastward_wind_profile: wind_u,
                northward_wind_profile: wind_v,
                profile_wind: wind_at_pres,
                profile_temperature: temp_at_pres,
                profile_dew_point: dew_at_pres,
                profile_mixing_ratio: mw_at_pres,
                parcel_pressure: parcel_pres,
                parcel_temperature: parcel_temp,
                parcel_mixing_ratio: parcel_mw,
                lcl_temperature: lcl_temp,
                lcl_pressure: lcl_pres,
                dry_trajectory: dry,
                wet_trajectory: wet,
                dry_virtual_temperature: dry_vt,
                wet_virtual_temperature: wet_vt,
                parcel_virtual_temperature: parcel_vt,
                environment_virtual_temperature: env_vt,
                buoyancy,
                lfc,
                lfc_temperature: lfc_temp,
                lnb,
                lnb_temperature: lnb_temp,
                energy_profile: energy_pro,
                cape,
                cin,
                lcl_point,
                lfc_point,
                lnb_point,
            },
        })
    }

    /// Handles to every input and output.
    #[inline]
    pub fn refs(&self) -> &AerologicalRefs {
        &self.refs
    }

    /// The underlying network.
    #[inline]
    pub fn network(&self) -> &Network {
        &self.net
    }

    /// The current value of any slot.
    pub fn value(&self, r: Ref) -> Result<&Quantity> {
        self.net.value(r)
    }

    /// Supply the sounding as it is stored, parallel columns of optional values.
    ///
    /// Levels without a pressure are dropped.
    pub fn set_sounding(
        &mut self,
        pressure: &[Optioned<HectoPascal>],
        temperature: &[Optioned<Celsius>],
        dew_point: &[Optioned<Celsius>],
    ) -> Result<Update> {
        let to_kelvin = |t: Celsius| Kelvin::from(t).unpack();

        let temperature =
            Profile::from_optioned(Kind::AirTemperature, pressure, temperature, to_kelvin)?;
        let dew_point = Profile::from_optioned(Kind::DewPoint, pressure, dew_point, to_kelvin)?;

        let mut update = self.set_temperature_profile(temperature)?;
        update.merge(self.set_dew_point_profile(dew_point)?);
        Ok(update)
    }

    /// Supply the environment temperature profile.
    pub fn set_temperature_profile(&mut self, profile: Profile) -> Result<Update> {
        self.net.set(self.refs.temperature_profile, profile.into())
    }

    /// Supply the environment dew point profile.
    pub fn set_dew_point_profile(&mut self, profile: Profile) -> Result<Update> {
        self.net.set(self.refs.dew_point_profile, profile.into())
    }

    /// Supply the wind profile. Levels without a pressure are dropped.
    pub fn set_wind_profile(
        &mut self,
        pressure: &[Optioned<HectoPascal>],
        wind: &[Optioned<WindSpdDir<Knots>>],
    ) -> Result<Update> {
        let u = Profile::from_optioned(Kind::EastwardWind, pressure, wind, |w| {
            WindUV::<Knots>::from(w).u.unpack()
        })?;
        let v = Profile::from_optioned(Kind::NorthwardWind, pressure, wind, |w| {
            WindUV::<Knots>::from(w).v.unpack()
        })?;

        let mut update = self.net.set(self.refs.eastward_wind_profile, u.into())?;
        update.merge(self.net.set(self.refs.northward_wind_profile, v.into())?);
        Ok(update)
    }

    /// Supply the reference pressure used by the point, layer and pressure modes.
    pub fn set_reference_pressure<P>(&mut self, pressure: P) -> Result<Update>
    where
        HectoPascal: From<P>,
    {
        self.net
            .set(self.refs.reference_pressure, Quantity::pressure(pressure))
    }

    /// Supply the reference temperature used by the point mode.
    pub fn set_reference_temperature<T>(&mut self, temperature: T) -> Result<Update>
    where
        Kelvin: From<T>,
    {
        self.net.set(
            self.refs.reference_temperature,
            Quantity::temperature(temperature),
        )
    }

    /// Supply the pressure the parcel is lifted to.
    pub fn set_minimum_pressure<P>(&mut self, pressure: P) -> Result<Update>
    where
        HectoPascal: From<P>,
    {
        self.net
            .set(self.refs.minimum_pressure, Quantity::pressure(pressure))
    }

    /// Choose how the parcel is initialized.
    pub fn set_parcel_mode(&mut self, mode: ParcelMode) -> Result<Update> {
        self.net
            .set(self.refs.parcel_mode, Quantity::index(mode.index()))
    }

    /// The current parcel mode.
    pub fn parcel_mode(&self) -> Option<ParcelMode> {
        use std::convert::TryFrom;

        let index = self.net.value(self.refs.parcel_mode).ok()?.to_f64()?;
        ParcelMode::try_from(index as i32).ok()
    }

    /// Starting pressure of the parcel.
    pub fn parcel_pressure(&self) -> Option<HectoPascal> {
        self.pressure(self.refs.parcel_pressure)
    }

    /// Starting temperature of the parcel.
    pub fn parcel_temperature(&self) -> Option<Kelvin> {
        self.temperature(self.refs.parcel_temperature)
    }

    /// Pressure of the LCL.
    pub fn lcl_pressure(&self) -> Option<HectoPascal> {
        self.pressure(self.refs.lcl_pressure)
    }

    /// Temperature of the LCL.
    pub fn lcl_temperature(&self) -> Option<Kelvin> {
        self.temperature(self.refs.lcl_temperature)
    }

    /// Pressure of the LFC.
    pub fn lfc(&self) -> Option<HectoPascal> {
        self.pressure(self.refs.lfc)
    }

    /// Pressure of the LNB.
    pub fn lnb(&self) -> Option<HectoPascal> {
        self.pressure(self.refs.lnb)
    }

    /// CAPE.
    pub fn cape(&self) -> Option<JpKg> {
        self.energy(self.refs.cape)
    }

    /// CIN.
    pub fn cin(&self) -> Option<JpKg> {
        self.energy(self.refs.cin)
    }

    /// The wind at the reference pressure, interpolated by components.
    pub fn profile_wind(&self) -> Option<WindSpdDir<Knots>> {
        match self.net.value(self.refs.profile_wind).ok()? {
            Quantity::RealTuple(parts) if parts.len() == 2 => {
                let u = parts[0].value()?;
                let v = parts[1].value()?;
                Some(WindSpdDir::from(WindUV {
                    u: Knots(u),
                    v: Knots(v),
                }))
            }
            _ => None,
        }
    }

    /// The buoyancy profile of the parcel.
    pub fn buoyancy(&self) -> Option<&Profile> {
        self.net
            .value(self.refs.buoyancy)
            .ok()
            .and_then(|q| q.as_profile().ok())
            .filter(|p| !p.is_missing())
    }

    fn pressure(&self, r: Ref) -> Option<HectoPascal> {
        self.net.value(r).ok().and_then(Quantity::to_pressure)
    }

    fn temperature(&self, r: Ref) -> Option<Kelvin> {
        self.net.value(r).ok().and_then(Quantity::to_temperature)
    }

    fn energy(&self, r: Ref) -> Option<JpKg> {
        self.net.value(r).ok().and_then(Quantity::to_energy)
    }
}
