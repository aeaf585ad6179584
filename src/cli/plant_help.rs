pub const PLANT_HELP: &'static str = "
                                General notes
A plant task is a single JSON document. Units: flows in m3/d, concentrations in g/m3,
volumes in m3, times in days unless the field name says hours, temperature in degrees C.
Only the sections `influent` and `topology` are required. Every omitted section, and every
omitted field inside the parameter sections, takes its ASM2d default value. Use menu item
3 to write a complete template (A2O plant) and edit it.

                                influent (required)
    Q: 10000.0          design flow
    COD: 400.0          total COD
    NH4: 25.0           ammonium N
    TP: 8.0             total phosphorus
    NO3: 0.0            nitrate N, optional
    VFA: 40.0           volatile fatty acids as COD, optional, goes to S_A
    PO4: null           orthophosphate P, optional, otherwise derived from TP
    BOD5, TSS, VSS, TKN: optional measurements used for fractionation checks
    alkalinity: 250.0   g CaCO3/m3, optional

                                influent_pattern (optional)
    { \"Constant\": {} }                                  default
    { \"Diurnal\": { \"flow_amplitude\": 0.3, \"load_amplitude\": 0.2,
                   \"flow_peak_hour\": 12.0, \"load_peak_hour\": 14.0 } }
    { \"Step\": { \"time\": 10.0, \"flow_factor\": 1.5, \"load_factor\": 1.0 } }

                                fractions (optional)
    f_SI, f_XI, f_SF, f_XH: shares of the total COD going to S_I, X_I, S_F and X_H;
    VFA go to S_A and the remainder is slowly biodegradable X_S.

                                topology (required)
    zones: list of zones in flow order, each with
        name: \"aerobic\"
        zone_type: \"Anaerobic\" | \"Anoxic\" | \"Aerobic\"
        volume: 4000.0          or HRT_hours: 9.6 (exactly one of the two)
        DO_setpoint: 2.0        aerobic zones only, optional
        feed_fraction: 0.5      step feed share, optional; given shares must sum to 1
    SRT: 15.0                   sludge retention time, d
    temperature: 20.0           5..35 degrees C
    internal_recycle_ratio: 3.0 nitrate recycle from the last zone, multiple of Q
    internal_recycle_to: null   zone name, default is the first anoxic zone
    return_sludge_ratio: 0.5    RAS to the first zone, multiple of Q
    denitrifying_pao: true      anoxic PAO processes
    chemical_precipitation: false
    metal_dose: 0.0             X_MeOH dose with the influent, g/m3
    capture_efficiency: 0.999   clarifier solids capture, 0 means no clarifier

                                simulation (optional)
    start_time: 0.0, end_time: 60.0, time_step: 0.001, reporting_interval: 1.0
    mode: \"SteadyState\" | \"Dynamic\"
    tolerance: 1e-3             steady-state convergence, 1/d
    initial_condition: \"Default\" | { \"Uniform\": {state} } | { \"PerZone\": [{state}, ...] }
    P_closure_tolerance: 10.0   allowed deviation of the P balance, %

                                kinetic, stoichiometric, temperature_coefficients (optional)
    ASM2d parameters by name at 20 degrees C, e.g. { \"mu_H\": 6.0, \"mu_AUT\": 1.0 }.

                                Output
The report (influent and effluent quality, removal, PAO metrics, phosphorus balance,
operating figures) is printed and written with the final zone states and the time series
to <task>_results.json next to the task file.
";
